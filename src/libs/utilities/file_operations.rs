use std::fs;
use std::io;
use std::path::Path;

/// Inserts `new_lines` right after the first line equal to `marker`
/// (surrounding whitespace ignored).
///
/// # Returns
/// * `Some(String)` with the patched text, keeping the original line endings
///   and trailing newline.
/// * `None` if no line matches the marker.
pub fn insert_after_marker(text: &str, marker: &str, new_lines: &[String]) -> Option<String> {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(text.len() + new_lines.iter().map(|l| l.len() + 2).sum::<usize>());
    let mut inserted = false;

    for line in text.split_inclusive('\n') {
        out.push_str(line);
        if !inserted && line.trim() == marker.trim() {
            if !line.ends_with('\n') {
                out.push_str(newline);
            }
            for new_line in new_lines {
                out.push_str(new_line);
                out.push_str(newline);
            }
            inserted = true;
        }
    }

    inserted.then_some(out)
}

/// Writes all lines to `path`, each terminated by a newline.
/// Empty content produces an empty file.
pub fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)
}

/// Creates an empty file, or leaves an existing one unchanged.
pub fn touch(path: &Path) -> io::Result<()> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
}
