//! ANSI color helpers for terminal output.
//!
//! Plain escape codes that work on most terminals.

/// ANSI escape codes
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

use ansi::*;

/// Format a success message (green)
pub fn success(msg: &str) -> String {
    format!("{}{}{}", GREEN, msg, RESET)
}

/// Format an error message (red, bold lead)
pub fn error(msg: &str) -> String {
    format!("{}{}{}{}", BOLD, RED, msg, RESET)
}

/// Format a warning message (yellow)
pub fn warning(msg: &str) -> String {
    format!("{}{}{}{}", BOLD, YELLOW, msg, RESET)
}

/// Format a status/info message (gray/dim)
pub fn status(msg: &str) -> String {
    format!("{}{}{}", GRAY, msg, RESET)
}

/// Format a hyperlink (blue)
pub fn link(msg: &str) -> String {
    format!("{}{}{}", BLUE, msg, RESET)
}

/// Format a command name in a listing (green)
pub fn command(msg: &str) -> String {
    format!("{}{}{}", GREEN, msg, RESET)
}

/// Format a speaker label in a chat transcript (cyan, bold)
pub fn speaker(msg: &str) -> String {
    format!("{}{}{}{}", BOLD, CYAN, msg, RESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_preserves_text() {
        let colored = success("loaded");
        assert!(colored.contains("loaded"));
        assert!(colored.starts_with(ansi::GREEN));
        assert!(colored.ends_with(ansi::RESET));
    }
}
