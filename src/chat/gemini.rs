//! Gemini chat adapter.
//!
//! Speaks the `generateContent` API: API key as a URL query parameter,
//! `{contents, systemInstruction}` request body, reply text at
//! `candidates[0].content.parts[0].text`. Also used for one-shot image
//! analysis with inline base64 data.

use super::{api_error, http_client, ChatError};
use crate::config::GeminiConfig;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Fixed instruction keeping chat replies on the radar domain.
const SYSTEM_INSTRUCTION: &str = "You are a helpful, brief, and knowledgeable assistant \
     for Ground Penetrating Radar (GPR) analysis. Provide concise answers. \
     Only provide information on GPRs.";

/// Gemini adapter bound to a resolved API key for one session.
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: String) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client: http_client(),
        }
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    /// Send one user message; the request carries no prior turns.
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::text(message)],
            }],
            system_instruction: Some(RequestContent {
                parts: vec![RequestPart::text(SYSTEM_INSTRUCTION)],
            }),
        };
        self.generate(request).await
    }

    /// One-shot image analysis: inline base64 image plus an instruction.
    pub async fn analyze_image(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, ChatError> {
        let data = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::inline_data(mime_type, data),
                    RequestPart::text(instruction),
                ],
            }],
            system_instruction: None,
        };
        self.generate(request).await
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.request_url())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let raw: serde_json::Value = response.json().await?;
        let reply = serde_json::from_value::<GenerateResponse>(raw.clone())
            .ok()
            .and_then(|r| r.candidates.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        reply.ok_or(ChatError::Empty { raw })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl RequestPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
