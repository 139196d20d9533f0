//! Chat provider implementations.
//!
//! One unified front for the two remote providers. The adapters differ only
//! in envelope shape and where the API key goes (bearer header for Groq,
//! query parameter for Gemini); timeout and error mapping are shared here so
//! both providers behave identically.

pub mod gemini;
pub mod groq;
pub mod session;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Fixed timeout applied to every provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by both adapters.
pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

/// A failed chat exchange. The session loop maps each variant to its own
/// user-facing message; none of them end the loop.
#[derive(Debug, Error)]
pub enum ChatError {
    /// DNS failure, refused connection, timeout, or an unreadable body.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success HTTP status, with the provider's embedded message when
    /// the error body was decodable.
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    /// A success response that carried no assistant text.
    #[error("empty reply from API")]
    Empty { raw: serde_json::Value },
}

/// Error envelope shared by both providers: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}

/// Map a non-success response to [`ChatError::Api`], preferring the
/// provider's embedded message over the raw status text.
pub(crate) async fn api_error(response: reqwest::Response) -> ChatError {
    let status = response.status();
    let message = match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => status.to_string(),
    };
    ChatError::Api { status, message }
}

/// Enum-based front for the chat providers.
/// An enum rather than trait objects: there are exactly two adapters.
pub enum Provider {
    Groq(groq::GroqClient),
    Gemini(gemini::GeminiClient),
}

impl Provider {
    /// Send one user message and return the assistant's reply text.
    /// Requests are stateless: no prior turns are attached.
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        match self {
            Provider::Groq(c) => c.send(message).await,
            Provider::Gemini(c) => c.send(message).await,
        }
    }

    /// Display label used for the transcript speaker line.
    pub fn title(&self) -> &'static str {
        match self {
            Provider::Groq(_) => "Groq",
            Provider::Gemini(_) => "Gemini",
        }
    }
}
