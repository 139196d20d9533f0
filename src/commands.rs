//! Menu command table.
//!
//! Maps literal input strings (and their registered synonyms) to actions.
//! Matching is exact against the trimmed, lower-cased input: no prefix or
//! fuzzy matching, and unknown strings stay unknown.

/// One dispatchable menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stream the command listing.
    Commands,
    /// Print a short explainer about ground-penetrating radars.
    AboutGpr,
    /// Enter the image reader sub-loop.
    OpenGpr,
    /// Send an image to Gemini for analysis.
    GeminiGpr,
    /// Chat with Groq.
    ChatGroq,
    /// Chat with Gemini.
    ChatGemini,
    /// Open the ML determiner website in the browser.
    GuiMlGpr,
    /// Text-based ML determiner (not available yet).
    TextMlGpr,
    /// Print support pointers.
    Help,
    /// Print version and changelog.
    Version,
    /// Clear the terminal screen.
    Clear,
    /// Replay the intro banner after confirmation.
    Restart,
    /// Open the GitHub repository in the browser.
    Github,
    /// Leave the hub.
    Exit,
}

/// Resolve a trimmed, lower-cased input line to a command.
pub fn parse(input: &str) -> Option<Command> {
    let command = match input {
        "commands" | "command" | "cmds" | "cmd" | "options" | "option" | "features"
        | "feature" | "show commands" => Command::Commands,
        "about_gpr" => Command::AboutGpr,
        "open_gpr" | "read_gpr" => Command::OpenGpr,
        "gemini_gpr" => Command::GeminiGpr,
        "chat groq" => Command::ChatGroq,
        "chat gemini" => Command::ChatGemini,
        "gui_ml_gpr" => Command::GuiMlGpr,
        "text_ml_gpr" => Command::TextMlGpr,
        "help" | "troubleshoot" | "error" | "errors" => Command::Help,
        "version" => Command::Version,
        "clear" => Command::Clear,
        "restart" | "intro" | "restart intro" | "start intro" => Command::Restart,
        "github" | "github repository" | "repo" | "github repo" => Command::Github,
        "exit" => Command::Exit,
        _ => return None,
    };
    Some(command)
}

/// `(name, description)` pairs for the streamed command listing.
pub fn listing() -> &'static [(&'static str, &'static str)] {
    &[
        ("about_gpr", "Learn about Ground-Penetrating Radars (GPRs)."),
        ("open_gpr", "Open a GPR image file as an intensity plot."),
        ("gemini_gpr", "Let Gemini see a GPR image and analyze it."),
        ("read_gpr", "Read and process GPR files."),
        ("exit", "Exit the GPR Hub."),
        ("commands", "Display this message with available commands."),
        ("chat groq", "Chat with Groq AI."),
        ("chat gemini", "Chat with Google Gemini AI."),
        ("gui_ml_gpr", "Open the website for the ML-based GPR determiner."),
        ("text_ml_gpr", "Text-based ML GPR determiner, right here."),
        ("help", "Where to get help with this CLI."),
        ("version", "Show version information."),
        ("clear", "Clear the terminal screen."),
        ("restart", "Replay the intro from the beginning."),
        ("github", "Open the GitHub repository for GPR Hub."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_names_resolve() {
        assert_eq!(parse("exit"), Some(Command::Exit));
        assert_eq!(parse("chat groq"), Some(Command::ChatGroq));
        assert_eq!(parse("chat gemini"), Some(Command::ChatGemini));
        assert_eq!(parse("open_gpr"), Some(Command::OpenGpr));
        assert_eq!(parse("gemini_gpr"), Some(Command::GeminiGpr));
        assert_eq!(parse("version"), Some(Command::Version));
    }

    #[test]
    fn test_synonyms_resolve_to_same_command() {
        for synonym in ["commands", "cmds", "options", "show commands"] {
            assert_eq!(parse(synonym), Some(Command::Commands), "{}", synonym);
        }
        assert_eq!(parse("read_gpr"), Some(Command::OpenGpr));
        assert_eq!(parse("repo"), Some(Command::Github));
        assert_eq!(parse("troubleshoot"), Some(Command::Help));
        assert_eq!(parse("restart intro"), Some(Command::Restart));
    }

    #[test]
    fn test_no_prefix_matching() {
        assert_eq!(parse("exi"), None);
        assert_eq!(parse("exit now"), None);
        assert_eq!(parse("chat"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_uppercase_is_not_matched() {
        // The dispatcher lower-cases before lookup; the table itself is exact.
        assert_eq!(parse("EXIT"), None);
    }

    #[test]
    fn test_every_listed_command_parses() {
        for (name, _) in listing() {
            assert!(parse(name).is_some(), "listed command {:?} must parse", name);
        }
    }
}
