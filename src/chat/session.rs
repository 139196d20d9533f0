//! Interactive chat sub-loop.
//!
//! One session per `chat groq` / `chat gemini` invocation: the API key is
//! resolved once at entry (config, then environment, then masked prompt) and
//! held only for the session's lifetime. Each turn is a single stateless
//! request; every failure is reported and the loop keeps going.

use super::gemini::GeminiClient;
use super::groq::GroqClient;
use super::{ChatError, Provider};
use crate::colors;
use crate::config::Config;
use crate::console::{wrap, Console, ReadOutcome};
use anyhow::Result;

const RULE_WIDTH: usize = 52;

/// Enter a Groq chat session. Returns without error when the user declines
/// to supply a key.
pub async fn run_groq_session<C: Console>(console: &mut C, config: &Config) -> Result<()> {
    let Some(key) = resolve_api_key(console, config.groq.api_key.as_deref(), "GROQ_API_KEY", "Groq")?
    else {
        console.print(&colors::error("Error: An API key is required to start the chat."));
        return Ok(());
    };
    let provider = Provider::Groq(GroqClient::new(&config.groq, key));
    run_session(console, &provider).await
}

/// Enter a Gemini chat session.
pub async fn run_gemini_session<C: Console>(console: &mut C, config: &Config) -> Result<()> {
    let Some(key) = resolve_api_key(
        console,
        config.gemini.api_key.as_deref(),
        "GEMINI_API_KEY",
        "Gemini",
    )?
    else {
        console.print(&colors::error("Error: An API key is required to start the chat."));
        return Ok(());
    };
    let provider = Provider::Gemini(GeminiClient::new(&config.gemini, key));
    run_session(console, &provider).await
}

/// Resolve an API key: config first, then the environment, then one masked
/// prompt. `None` means the user declined; the caller aborts session entry.
pub fn resolve_api_key<C: Console>(
    console: &mut C,
    configured: Option<&str>,
    env_var: &str,
    provider_name: &str,
) -> Result<Option<String>> {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return Ok(Some(key.to_string()));
        }
    }
    if let Ok(key) = std::env::var(env_var) {
        if !key.trim().is_empty() {
            return Ok(Some(key));
        }
    }

    console.print(&colors::warning(&format!(
        "Warning: {} API key is not set in {} or the config file.",
        provider_name, env_var
    )));
    let key = console.read_secret(&format!(
        "Please enter your {} API Key (input is hidden)",
        provider_name
    ))?;
    if key.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(key))
}

/// The turn loop. `exit`/`quit` (any case), interrupt, and end-of-input all
/// return to the dispatcher; blank input re-prompts without a request.
pub async fn run_session<C: Console>(console: &mut C, provider: &Provider) -> Result<()> {
    tracing::info!(provider = provider.title(), "chat session started");
    console.print(&"-".repeat(RULE_WIDTH));
    console.print(&format!("{} AI Chat initialized.", provider.title()));
    console.print("Type 'exit' or 'quit' to return to the main menu.");
    console.print(&"-".repeat(RULE_WIDTH));

    loop {
        let line = match console.read_line("You: ")? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted | ReadOutcome::Eof => {
                console.print("Exiting chat...");
                break;
            }
        };

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            console.print("Exiting chat...");
            break;
        }
        if message.is_empty() {
            continue;
        }

        console.print(&colors::status("Thinking..."));
        match provider.send(message).await {
            Ok(reply) => {
                console.print(&format!("{}:", colors::speaker(provider.title())));
                let width = console.width().saturating_sub(2).max(20);
                console.print(&wrap(&reply, width, "  "));
                console.print("");
            }
            Err(err) => report_chat_error(console, &err),
        }
    }
    Ok(())
}

/// Per-variant user-facing failure messages, shared with the image analyzer.
pub fn report_chat_error<C: Console>(console: &mut C, err: &ChatError) {
    match err {
        ChatError::Api { message, .. } => {
            console.print(&colors::error("API Error:"));
            console.print(message);
        }
        ChatError::Transport(source) => {
            console.print(&format!(
                "{} {}",
                colors::error("Network/Request Error:"),
                source
            ));
        }
        ChatError::Empty { raw } => {
            console.print(&colors::error("Error: Received empty reply from API."));
            console.print(&format!("Raw Output: {}", raw));
        }
    }
}

#[cfg(test)]
pub mod stub {
    //! One-shot HTTP endpoint stub for provider tests.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one request with the given status line and JSON body.
    /// Returns the base URL and the server task handle.
    pub async fn endpoint(status: &str, body: &str) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut seen = Vec::new();
            let mut buf = [0u8; 8192];
            loop {
                if request_complete(&seen) {
                    break;
                }
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => seen.extend_from_slice(&buf[..n]),
                }
            }
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        (format!("http://{}", addr), handle)
    }

    /// True once the headers and the announced body length have arrived.
    fn request_complete(seen: &[u8]) -> bool {
        let Some(pos) = seen.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&seen[..pos]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        seen.len() >= pos + 4 + body_len
    }
}
