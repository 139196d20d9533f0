//! Image reader sub-loop.
//!
//! One state: awaiting a command. `upload <path>` decodes and displays,
//! `exit` returns to the main menu, anything else prints the usage hint.
//! Every decode failure is reported and leaves the loop running.

use super::{grid, render, IntensityGrid};
use crate::colors;
use crate::console::{Console, ReadOutcome};
use anyhow::Result;
use std::path::Path;

pub fn run<C: Console>(console: &mut C) -> Result<()> {
    console.print("Welcome to the GPR Image Reader.");
    console.print("Type 'upload <file_path>' to load an image, or 'exit' to quit.");
    console.print("Make sure that the file path does not contain spaces.");
    console.print("Examples:");
    console.print("   Windows: upload C:\\Data\\profile.png");
    console.print("   Linux/macOS: upload /home/user/data/profile.png");

    let mut current: Option<IntensityGrid> = None;

    loop {
        let line = match console.read_line("\n> ")? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted | ReadOutcome::Eof => {
                console.print("Exiting GPR Reader.");
                break;
            }
        };
        let input = line.trim();
        let lowered = input.to_lowercase();

        if lowered == "exit" {
            console.print("Exiting GPR Reader.");
            break;
        }

        if lowered == "upload" {
            console.print(&colors::warning("Please provide the full path after 'upload'."));
            continue;
        }

        if lowered.starts_with("upload ") {
            // path is the remainder of the raw line, stray quotes stripped
            let raw_path = input
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest)
                .unwrap_or("")
                .trim();
            let path = raw_path.replace(['"', '\''], "");
            if path.is_empty() {
                console.print(&colors::warning("Please provide the full path after 'upload'."));
                continue;
            }
            // each upload replaces the held grid, even when it fails
            current = process_upload(console, Path::new(&path));
            if let Some(grid) = &current {
                tracing::debug!(rows = grid.rows(), cols = grid.cols(), "intensity grid held");
            }
            continue;
        }

        console.print("Unknown input. Use 'upload <file_path>' to load an image, or 'exit' to quit.");
    }
    Ok(())
}

/// Decode and display one upload. Failures are printed and swallowed.
fn process_upload<C: Console>(console: &mut C, path: &Path) -> Option<IntensityGrid> {
    let grid = match grid::load(path) {
        Ok(grid) => grid,
        Err(err) => {
            console.print(&colors::error(&format!("Error: {}", err)));
            return None;
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    console.print(&colors::success(&format!(
        "Image loaded successfully from: {}",
        name
    )));
    console.print(&format!(
        "Intensity grid: {} rows (depth/time) x {} cols (distance).",
        grid.rows(),
        grid.cols()
    ));

    display(console, &grid);
    Some(grid)
}

/// Render the grid to a PNG and open the platform viewer.
fn display<C: Console>(console: &mut C, grid: &IntensityGrid) {
    match render::save_to_temp(grid) {
        Ok(path) => {
            let (min, max) = grid.min_max();
            console.print(&format!("Rendered intensity plot: {}", path.display()));
            console.print("Axes: Distance (pixels) horizontal, Depth/Time (pixels) vertical.");
            console.print(&format!("Amplitude/Intensity range: {:.2} to {:.2}", min, max));
            console.open_external(&path.to_string_lossy());
        }
        Err(err) => {
            console.print(&colors::error(&format!("Failed to render the plot: {}", err)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::script::ScriptedConsole;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_exit_leaves_sub_loop() {
        let mut console = ScriptedConsole::new(&["exit"]);
        run(&mut console).unwrap();
        assert!(console.transcript().contains("Exiting GPR Reader."));
    }

    #[test]
    fn test_eof_leaves_sub_loop() {
        let mut console = ScriptedConsole::new(&[]);
        run(&mut console).unwrap();
        assert!(console.transcript().contains("Exiting GPR Reader."));
    }

    #[test]
    fn test_missing_file_is_recoverable() {
        let mut console = ScriptedConsole::new(&["upload /nope/missing.png", "exit"]);
        run(&mut console).unwrap();
        let transcript = console.transcript();
        assert!(transcript.contains("File not found"));
        // the loop kept running and exited on request afterwards
        assert!(transcript.contains("Exiting GPR Reader."));
    }

    #[test]
    fn test_upload_without_path_hints() {
        let mut console = ScriptedConsole::new(&["upload", "exit"]);
        run(&mut console).unwrap();
        assert!(console
            .transcript()
            .contains("Please provide the full path after 'upload'."));
    }

    #[test]
    fn test_unknown_input_prints_usage_hint() {
        let mut console = ScriptedConsole::new(&["resample", "exit"]);
        run(&mut console).unwrap();
        assert!(console.transcript().contains("Unknown input"));
    }

    #[test]
    fn test_upload_decodes_and_opens_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radargram.png");
        let mut rgba = RgbaImage::new(4, 3);
        rgba.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        rgba.save(&path).unwrap();

        let command = format!("upload {}", path.display());
        let mut console = ScriptedConsole::new(&[&command, "exit"]);
        run(&mut console).unwrap();

        let transcript = console.transcript();
        assert!(transcript.contains("Image loaded successfully from: radargram.png"));
        assert!(transcript.contains("3 rows"));
        assert!(transcript.contains("4 cols"));
        assert!(transcript.contains("<opened"));
    }

    #[test]
    fn test_upload_strips_quotes_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quoted.png");
        RgbaImage::new(1, 1).save(&path).unwrap();

        let command = format!("upload \"{}\"", path.display());
        let mut console = ScriptedConsole::new(&[&command, "exit"]);
        run(&mut console).unwrap();
        assert!(console
            .transcript()
            .contains("Image loaded successfully from: quoted.png"));
    }
}
