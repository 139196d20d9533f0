//! Top-level command dispatcher.
//!
//! One blocking read-eval loop: trim and lower-case the line, match it
//! exactly against the command table, run the bound action, repeat. The loop
//! only ends through `exit`, an interrupt, or end-of-input, each of which
//! prints the goodbye message and unwinds to `main` with a success status.

use crate::chat::gemini::GeminiClient;
use crate::chat::session::{self, report_chat_error, resolve_api_key};
use crate::colors;
use crate::commands::{self, Command};
use crate::config::Config;
use crate::console::{wrap, Console, KeyboardGate, ReadOutcome};
use crate::radar::reader;
use crate::update;
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

/// Tag compared against published release tags.
pub const VERSION_TAG: &str = concat!("v", env!("CARGO_PKG_VERSION"));

const PROMPT: &str = "Enter 'commands' to obtain functional commands (or Ctrl+C to stop): ";
const GOODBYE: &str = "Exiting GPR Hub. Goodbye!";
const REPO_URL: &str = "https://github.com/codemaster-ar/gpr-hub-cli";
const DETERMINER_URL: &str = "https://codemaster-ar.github.io/gpr-hub-web/ai-gpr-determiner/";
const SUPPORT_EMAIL: &str = "codemaster.ar@gmail.com";
const SEPARATOR: &str = "──────────────────────────────────────────";

const HEADLINE_DELAY: Duration = Duration::from_millis(5);
const LISTING_DELAY: Duration = Duration::from_micros(500);

const LOGO: &str = r#"
  ____ ____  ____    _   _       _
 / ___|  _ \|  _ \  | | | |_   _| |__
| |  _| |_) | |_) | | |_| | | | | '_ \
| |_| |  __/|  _ <  |  _  | |_| | |_) |   Rust CLI Edition
 \____|_|   |_| \_\ |_| |_|\__,_|_.__/
"#;

const ANALYSIS_INSTRUCTION: &str = "Analyze this image in detail. If it is a \
     Ground-Penetrating Radar (GPR) radargram, identify any clear hyperbolic \
     reflections, their relative depth/location, and suggest the potential \
     subsurface objects or features (e.g., rebar, pipe, void). If it is not \
     a GPR image, simply describe its contents.";

/// Whether the read-eval loop keeps going after a command.
enum Flow {
    Continue,
    Exit,
}

pub struct Dispatcher<C: Console> {
    console: C,
    gate: KeyboardGate,
    config: Config,
}

impl<C: Console> Dispatcher<C> {
    pub fn new(console: C, config: Config) -> Self {
        Self {
            console,
            gate: KeyboardGate::new(),
            config,
        }
    }

    /// Intro banner plus the release check. The keyboard gate stays disabled
    /// until all startup text has streamed.
    pub async fn startup(&mut self, skip_update_check: bool) {
        self.gate.disable();
        self.console.clear();
        self.intro_lines();
        if !skip_update_check {
            update::check_for_updates(&mut self.console, &self.config.update.repo, VERSION_TAG)
                .await;
        }
        self.gate.enable();
    }

    /// The main loop. Returns (and the process exits 0) on `exit`,
    /// interrupt, or end-of-input.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            // streaming blocks always re-enable the gate before this read
            debug_assert!(self.gate.is_enabled());
            let line = match self.console.read_line(PROMPT)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted | ReadOutcome::Eof => {
                    self.console.print(GOODBYE);
                    return Ok(());
                }
            };

            let input = line.trim().to_lowercase();
            match commands::parse(&input) {
                Some(command) => {
                    if let Flow::Exit = self.dispatch(command).await? {
                        return Ok(());
                    }
                }
                None => {
                    self.console.print(&format!(
                        "Invalid input \"{}\". Please enter 'commands' to see available commands.",
                        input
                    ));
                }
            }
            self.console.print("");
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Exit => {
                self.console.print(GOODBYE);
                return Ok(Flow::Exit);
            }
            Command::Commands => self.show_commands(),
            Command::AboutGpr => self.about(),
            Command::OpenGpr => reader::run(&mut self.console)?,
            Command::GeminiGpr => self.gemini_image_analysis().await?,
            Command::ChatGroq => {
                session::run_groq_session(&mut self.console, &self.config).await?
            }
            Command::ChatGemini => {
                session::run_gemini_session(&mut self.console, &self.config).await?
            }
            Command::GuiMlGpr => {
                self.console.print(&format!(
                    "Opening the ML GPR Analyzer website in your default browser: {}",
                    colors::link(DETERMINER_URL)
                ));
                self.console.open_external(DETERMINER_URL);
            }
            Command::TextMlGpr => {
                self.console.print(
                    "Feature under development - coming soon! Try the GUI version meanwhile by entering the 'gui_ml_gpr' command!",
                );
            }
            Command::Help => self.help(),
            Command::Version => self.version(),
            Command::Clear => self.console.clear(),
            Command::Restart => self.restart()?,
            Command::Github => {
                self.console.print(&format!(
                    "Opening the GPR Hub GitHub repository ({}) in your default browser...",
                    colors::link(REPO_URL)
                ));
                self.console.open_external(REPO_URL);
            }
        }
        Ok(Flow::Continue)
    }

    /// Stream the command listing. The gate is disabled for the whole block
    /// so buffered keypresses are not treated as hotkeys mid-stream.
    fn show_commands(&mut self) {
        self.gate.disable();
        self.console.stream("\nAvailable Commands:", HEADLINE_DELAY);
        for (name, description) in commands::listing() {
            let padded = format!("{:<14}", name);
            self.console.stream(
                &format!("{} - {}", colors::command(&padded), description),
                LISTING_DELAY,
            );
        }
        self.console.stream(
            "Enter a command to get started. Commands are case sensitive.",
            LISTING_DELAY,
        );
        self.gate.enable();
        self.console.print(SEPARATOR);
    }

    fn about(&mut self) {
        self.console.print(
            "GPRs are powerful tools that scan the subsurface without contact, mapping it without the risk of damaging the environment or, possibly, any artifacts.",
        );
        self.console.print(&format!(
            "See {} for more.",
            colors::link(REPO_URL)
        ));
    }

    fn help(&mut self) {
        self.console.print(&format!(
            "Report any errors to {} or open an issue in the GitHub repository ({}).",
            colors::link(SUPPORT_EMAIL),
            colors::link(REPO_URL)
        ));
    }

    fn version(&mut self) {
        self.console.print("");
        self.console
            .print(&format!("GPR Hub - Version {} - Rust CLI Edition", VERSION_TAG));
        self.console.stream("Changelog:", HEADLINE_DELAY);
        self.console
            .stream("Rewritten as a native executable.", LISTING_DELAY);
        self.console.stream(
            "Unified the two chat providers behind one adapter front.",
            LISTING_DELAY,
        );
        self.console.stream(
            "Endpoints, models, and keys are configurable via config.toml.",
            LISTING_DELAY,
        );
        self.console.print(SEPARATOR);
    }

    fn restart(&mut self) -> Result<()> {
        self.console
            .print("This will clear the entire screen. Proceed? (y/n)");
        let answer = match self.console.read_line("")? {
            ReadOutcome::Line(line) => line.trim().to_lowercase(),
            ReadOutcome::Interrupted | ReadOutcome::Eof => {
                self.console.print("Restart halted.");
                return Ok(());
            }
        };
        match answer.as_str() {
            "y" | "yes" | "proceed" | "continue" => {
                self.gate.disable();
                self.console.clear();
                self.intro_lines();
                self.gate.enable();
            }
            "n" | "no" | "cancel" => self.console.print("Restart halted."),
            _ => self.console.print(
                "Invalid input. Please enter 'y' to replay the intro or 'n' to cancel.",
            ),
        }
        Ok(())
    }

    fn intro_lines(&mut self) {
        self.console
            .stream(&colors::success(LOGO), HEADLINE_DELAY);
        self.console.stream("GPR Hub (CLI) Rust edition", HEADLINE_DELAY);
        self.console
            .stream(&format!("Version: {}", VERSION_TAG), HEADLINE_DELAY);
        self.console
            .stream("Ensure that your terminal is in fullscreen.", HEADLINE_DELAY);
        self.console.stream(
            "If you face any issues, seek help from the GitHub repository:",
            HEADLINE_DELAY,
        );
        self.console
            .stream(&colors::link(REPO_URL), HEADLINE_DELAY);
        self.console.stream(
            &format!(
                "You can also contact {} for more details or troubleshooting.",
                colors::link(SUPPORT_EMAIL)
            ),
            HEADLINE_DELAY,
        );
        self.console.print("");
    }

    /// Prompt for an image path and let Gemini describe the radargram.
    async fn gemini_image_analysis(&mut self) -> Result<()> {
        let Some(key) = resolve_api_key(
            &mut self.console,
            self.config.gemini.api_key.as_deref(),
            "GEMINI_API_KEY",
            "Gemini",
        )?
        else {
            self.console
                .print(&colors::error("Error: An API key is required for image analysis."));
            return Ok(());
        };
        let client = GeminiClient::new(&self.config.gemini, key);

        self.console.print("Gemini GPR Image Analyzer:");
        self.console.print(
            "Please paste the pure path to your image file, without any extra quotes or spaces.",
        );
        let line = match self.console.read_line(
            "Please enter the full path to your image file (e.g., /home/user/radargram.png): ",
        )? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted | ReadOutcome::Eof => return Ok(()),
        };
        let entered = line.trim();
        if entered.is_empty() {
            self.console.print(&colors::warning("No path entered."));
            return Ok(());
        }

        let path = Path::new(entered);
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.console.print(&colors::error(&format!(
                    "Error: The file was not found at '{}'. Please check the path and try again.",
                    path.display()
                )));
                return Ok(());
            }
            Err(err) => {
                self.console.print(&colors::error(&format!(
                    "An unexpected error occurred while reading the file: {}",
                    err
                )));
                return Ok(());
            }
        };
        let mime_type = mime_for_extension(&mut self.console, path);

        self.console
            .print(&colors::status("Sending request to the Gemini API..."));
        match client
            .analyze_image(&bytes, mime_type, ANALYSIS_INSTRUCTION)
            .await
        {
            Ok(text) => {
                self.console.print("====================================");
                self.console.print("       GEMINI ANALYSIS RESULT");
                self.console.print("====================================");
                let width = self.console.width().saturating_sub(2).max(20);
                self.console.print(&wrap(&text, width, "  "));
                self.console.print("====================================");
            }
            Err(err) => report_chat_error(&mut self.console, &err),
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn gate(&self) -> &KeyboardGate {
        &self.gate
    }

    #[cfg(test)]
    pub fn console(&self) -> &C {
        &self.console
    }
}

/// MIME type from the file extension; unknown extensions warn and fall back
/// to JPEG.
fn mime_for_extension<C: Console>(console: &mut C, path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        other => {
            console.print(&colors::warning(&format!(
                "Warning: Unknown file type '{}'. Using image/jpeg as the default MIME type.",
                other.unwrap_or("")
            )));
            "image/jpeg"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::session::stub;
    use crate::console::script::ScriptedConsole;

    fn dispatcher_with(
        inputs: &[&str],
        config: Config,
    ) -> Dispatcher<ScriptedConsole> {
        Dispatcher::new(ScriptedConsole::new(inputs), config)
    }

    #[tokio::test]
    async fn test_unrecognized_command_echoes_input() {
        let mut dispatcher = dispatcher_with(&["definitely_not_a_command", "exit"], Config::default());
        dispatcher.run().await.unwrap();
        let transcript = dispatcher.console().transcript();
        assert!(transcript.contains("Invalid input \"definitely_not_a_command\"."));
        assert!(transcript.contains(GOODBYE));
    }

    #[tokio::test]
    async fn test_input_is_trimmed_and_lowercased() {
        let mut dispatcher = dispatcher_with(&["  EXIT  "], Config::default());
        dispatcher.run().await.unwrap();
        assert!(dispatcher.console().transcript().contains(GOODBYE));
    }

    #[tokio::test]
    async fn test_eof_exits_with_goodbye() {
        let mut dispatcher = dispatcher_with(&[], Config::default());
        dispatcher.run().await.unwrap();
        assert!(dispatcher.console().transcript().contains(GOODBYE));
    }

    #[tokio::test]
    async fn test_command_listing_toggles_gate_and_returns() {
        let mut dispatcher = dispatcher_with(&["commands", "exit"], Config::default());
        dispatcher.run().await.unwrap();
        let transcript = dispatcher.console().transcript();
        assert!(transcript.contains("Available Commands:"));
        assert!(transcript.contains("about_gpr"));
        // gate went disable -> enable exactly once around the stream
        assert!(dispatcher.gate().is_enabled());
        assert_eq!(dispatcher.gate().transitions(), 2);
    }

    #[tokio::test]
    async fn test_github_command_opens_repository() {
        let mut dispatcher = dispatcher_with(&["github", "exit"], Config::default());
        dispatcher.run().await.unwrap();
        assert!(dispatcher
            .console()
            .transcript()
            .contains("<opened https://github.com/codemaster-ar/gpr-hub-cli>"));
    }

    #[tokio::test]
    async fn test_restart_declined_keeps_screen() {
        let mut dispatcher = dispatcher_with(&["restart", "n", "exit"], Config::default());
        dispatcher.run().await.unwrap();
        let transcript = dispatcher.console().transcript();
        assert!(transcript.contains("Restart halted."));
        assert!(!transcript.contains("<cleared>"));
    }

    #[tokio::test]
    async fn test_restart_confirmed_replays_intro() {
        let mut dispatcher = dispatcher_with(&["restart", "y", "exit"], Config::default());
        dispatcher.run().await.unwrap();
        let transcript = dispatcher.console().transcript();
        assert!(transcript.contains("<cleared>"));
        assert!(transcript.contains("GPR Hub (CLI) Rust edition"));
    }

    #[tokio::test]
    async fn test_image_sub_loop_exit_returns_to_menu() {
        let mut dispatcher = dispatcher_with(
            &["open_gpr", "exit", "about_gpr", "exit"],
            Config::default(),
        );
        dispatcher.run().await.unwrap();
        let transcript = dispatcher.console().transcript();
        assert!(transcript.contains("Exiting GPR Reader."));
        // the menu kept serving commands after the sub-loop ended
        assert!(transcript.contains("GPRs are powerful tools"));
        assert!(transcript.contains(GOODBYE));
    }

    #[tokio::test]
    async fn test_chat_session_end_to_end_with_stub_endpoint() {
        let body = r#"{"choices":[{"message":{"content":"Hi there"}}]}"#;
        let (url, server) = stub::endpoint("200 OK", body).await;

        let mut config = Config::default();
        config.groq.endpoint = url;
        config.groq.api_key = Some("gsk_test".to_string());

        let mut dispatcher =
            dispatcher_with(&["chat groq", "hello", "exit", "about_gpr", "exit"], config);
        dispatcher.run().await.unwrap();
        server.await.unwrap();

        let transcript = dispatcher.console().transcript();
        assert!(transcript.contains("Hi there"));
        // `exit` inside the chat only left the session, not the process loop
        assert!(transcript.contains("Exiting chat..."));
        assert!(transcript.contains("GPRs are powerful tools"));
        assert!(transcript.contains(GOODBYE));
    }

    #[tokio::test]
    async fn test_gemini_image_analysis_missing_file() {
        let mut config = Config::default();
        config.gemini.api_key = Some("AIza-test".to_string());
        config.gemini.endpoint = "http://127.0.0.1:9".to_string();

        let mut dispatcher =
            dispatcher_with(&["gemini_gpr", "/nope/nothing.png", "exit"], config);
        dispatcher.run().await.unwrap();
        let transcript = dispatcher.console().transcript();
        assert!(transcript.contains("The file was not found at '/nope/nothing.png'"));
        assert!(transcript.contains(GOODBYE));
    }

    #[test]
    fn test_mime_for_extension() {
        let mut console = ScriptedConsole::new(&[]);
        assert_eq!(
            mime_for_extension(&mut console, Path::new("a.PNG")),
            "image/png"
        );
        assert_eq!(
            mime_for_extension(&mut console, Path::new("a.JpG")),
            "image/jpeg"
        );
        assert!(console.output.is_empty());
        assert_eq!(
            mime_for_extension(&mut console, Path::new("a.tiff")),
            "image/jpeg"
        );
        assert!(console.transcript().contains("Unknown file type 'tiff'"));
    }
}
