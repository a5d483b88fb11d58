//! REST client for the Gemini `generateContent` endpoint.
//!
//! Replies use a fast model; feedback uses a stronger model and asks for a
//! JSON response body.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::generator::{ReplyRequest, ResponseGenerator};
use crate::prompts;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REPLY_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FEEDBACK_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Empty means "not configured"; every call then fails with
    /// [`GenerationError::MissingApiKey`].
    pub api_key: String,
    pub reply_model: String,
    pub feedback_model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            reply_model: DEFAULT_REPLY_MODEL.to_string(),
            feedback_model: DEFAULT_FEEDBACK_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ---- wire types ----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first candidate, with its parts concatenated.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        generation_config: Option<GenerationConfig>,
    ) -> Result<String, GenerationError> {
        if !self.is_configured() {
            return Err(GenerationError::MissingApiKey);
        }

        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config,
        };

        tracing::debug!(model, prompt_chars = prompt.len(), "Calling generateContent");

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.base_url.trim_end_matches('/'),
                model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(GenerationError::EmptyResponse)
    }

    /// Ensure the response has a success status code, or turn it into a
    /// [`GenerationError::Api`] carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ResponseGenerator for GeminiClient {
    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String, GenerationError> {
        let prompt = prompts::reply_prompt(request);
        self.generate(&self.config.reply_model, &prompt, None).await
    }

    async fn generate_structured_feedback(&self, prompt: &str) -> Result<String, GenerationError> {
        let json_mode = GenerationConfig {
            response_mime_type: "application/json",
        };
        self.generate(&self.config.feedback_model, prompt, Some(json_mode))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::personality::Personality;

    fn parse(raw: &str) -> Option<String> {
        serde_json::from_str::<GenerateResponse>(raw)
            .unwrap()
            .into_text()
    }

    #[test]
    fn first_candidate_parts_are_joined() {
        let raw = r#"{"candidates":[
            {"content":{"parts":[{"text":"Carbon pricing "},{"text":"works."}]}},
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"#;
        assert_eq!(parse(raw).as_deref(), Some("Carbon pricing works."));
    }

    #[test]
    fn missing_or_blank_text_is_empty() {
        assert_eq!(parse(r#"{"candidates":[]}"#), None);
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#), None);
        assert_eq!(
            parse(r#"{"candidates":[{"content":{"parts":[{"text":"  \n"}]}}]}"#),
            None
        );
    }

    #[test]
    fn request_body_uses_camel_case_wire_names() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: "hi" }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );

        let plain = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: "hi" }],
            }],
            generation_config: None,
        };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn unconfigured_client_fails_without_network() {
        let client = GeminiClient::new(GeminiConfig::default()).unwrap();
        assert!(!client.is_configured());

        let request = ReplyRequest {
            topic: "Remote work".into(),
            personality: Personality::Emotional,
            recent_messages: Vec::new(),
            cue: None,
        };
        let err = client.generate_reply(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));

        let err = client.generate_structured_feedback("{}").await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}
