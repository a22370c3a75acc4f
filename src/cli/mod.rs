// Command-line definition.
pub mod cmd_enums;
