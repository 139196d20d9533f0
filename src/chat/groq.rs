//! Groq chat adapter.
//!
//! Speaks the OpenAI-compatible chat completions API: bearer-token
//! authorization, `{model, messages}` request body, reply text at
//! `choices[0].message.content`.

use super::{api_error, http_client, ChatError};
use crate::config::GroqConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Groq adapter bound to a resolved API key for one session.
pub struct GroqClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
}

impl GroqClient {
    pub fn new(config: &GroqConfig, api_key: String) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            client: http_client(),
        }
    }

    /// Send one user message; the request carries no prior turns.
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: message.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let raw: serde_json::Value = response.json().await?;
        let reply = serde_json::from_value::<ChatResponse>(raw.clone())
            .ok()
            .and_then(|r| r.choices.into_iter().next())
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty());

        reply.ok_or(ChatError::Empty { raw })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroqConfig;

    fn client_for(endpoint: &str) -> GroqClient {
        let config = GroqConfig {
            endpoint: endpoint.to_string(),
            ..GroqConfig::default()
        };
        GroqClient::new(&config, "gsk_test".to_string())
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_reply_extraction_path() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hi there"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Hi there");
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_api_error() {
        // Nothing listens on this port; the send must surface as Transport.
        let client = client_for("http://127.0.0.1:9/v1/chat/completions");
        match client.send("hello").await {
            Err(ChatError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other.map(|_| ())),
        }
    }
}
