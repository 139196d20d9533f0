//! Terminal capability layer for the hub.
//!
//! The dispatcher, chat sessions, and image sub-loop all talk to a [`Console`]
//! instead of stdin/stdout directly, so the interactive flows can be exercised
//! in tests with a scripted double and without real streaming delays.

use anyhow::Result;
use crossterm::{
    cursor,
    terminal::{self, Clear, ClearType},
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use std::time::Duration;

/// Width used when the terminal size cannot be determined.
pub const FALLBACK_WIDTH: usize = 80;

/// Outcome of one prompted read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The user submitted a line.
    Line(String),
    /// The user pressed Ctrl+C.
    Interrupted,
    /// End of input (Ctrl+D or a closed stdin).
    Eof,
}

/// Display and input capability.
pub trait Console {
    /// Block for one line of input.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Block for one line of masked input (API keys). Returns the entered
    /// text; an empty string means the user declined.
    fn read_secret(&mut self, prompt: &str) -> Result<String>;

    /// Print one line.
    fn print(&mut self, text: &str);

    /// Print one line character by character with `delay` between characters.
    fn stream(&mut self, text: &str, delay: Duration);

    /// Current terminal width in columns.
    fn width(&self) -> usize;

    /// Clear the screen.
    fn clear(&mut self);

    /// Hand a URL or file path to the platform opener (side effect; failures
    /// are reported, never fatal).
    fn open_external(&mut self, target: &str);
}

/// Enable/disable state for keyboard hotkey interception.
///
/// Owned by the dispatcher and toggled at well-defined points: disabled while
/// menu text is streaming so buffered keypresses are not treated as hotkeys,
/// re-enabled before the next prompt is read.
#[derive(Debug)]
pub struct KeyboardGate {
    enabled: bool,
    transitions: u32,
}

impl KeyboardGate {
    pub fn new() -> Self {
        Self {
            enabled: true,
            transitions: 0,
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.transitions += 1;
        tracing::debug!("keyboard gate disabled");
    }

    pub fn enable(&mut self) {
        self.enabled = true;
        self.transitions += 1;
        tracing::debug!("keyboard gate enabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of enable/disable toggles so far.
    #[cfg(test)]
    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}

impl Default for KeyboardGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Real terminal console: rustyline for the prompt loop, dialoguer for masked
/// input, crossterm for width and clearing.
pub struct TermConsole {
    editor: DefaultEditor,
    animate: bool,
}

impl TermConsole {
    /// Create a terminal console. When `animate` is false, streaming delays
    /// are skipped entirely.
    pub fn new(animate: bool) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        Ok(Self { editor, animate })
    }
}

impl Console for TermConsole {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(&line);
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        let secret = dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(secret)
    }

    fn print(&mut self, text: &str) {
        println!("{}", text);
    }

    fn stream(&mut self, text: &str, delay: Duration) {
        if !self.animate || delay.is_zero() {
            println!("{}", text);
            return;
        }
        let mut stdout = io::stdout();
        for ch in text.chars() {
            print!("{}", ch);
            let _ = stdout.flush();
            std::thread::sleep(delay);
        }
        println!();
    }

    fn width(&self) -> usize {
        terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(FALLBACK_WIDTH)
    }

    fn clear(&mut self) {
        let _ = crossterm::execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0));
    }

    fn open_external(&mut self, target: &str) {
        if let Err(e) = crate::launcher::open(target) {
            println!("{}", crate::colors::warning(&format!("Could not open {}: {}", target, e)));
        }
    }
}

/// Greedy word wrap with a hanging indent on continuation lines.
///
/// Whitespace (including newlines) is collapsed, matching the behavior of a
/// plain paragraph filler. Words longer than the width get their own line.
pub fn wrap(text: &str, width: usize, subsequent_indent: &str) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = format!("{}{}", subsequent_indent, word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}
