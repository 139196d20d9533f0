//! Platform opener for URLs and rendered files.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Hand `target` (a URL or file path) to the platform's default opener.
/// The child is detached; its exit status is not observed.
#[cfg(target_os = "macos")]
pub fn open(target: &str) -> Result<()> {
    spawn_detached(Command::new("open").arg(target))
}

#[cfg(all(unix, not(target_os = "macos")))]
pub fn open(target: &str) -> Result<()> {
    spawn_detached(Command::new("xdg-open").arg(target))
}

#[cfg(windows)]
pub fn open(target: &str) -> Result<()> {
    // `start` is a cmd builtin; the empty string is the window title slot.
    spawn_detached(Command::new("cmd").args(["/C", "start", "", target]))
}

fn spawn_detached(command: &mut Command) -> Result<()> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to launch the system opener")?;
    Ok(())
}
