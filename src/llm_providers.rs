use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::models::{ChatMessage, InlineImage};

/// Sampling temperature used for every provider call
pub const TEMPERATURE: f32 = 0.7;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Structured-generation request: the provider must answer with JSON matching `schema`
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    pub schema: Value,
}

/// One tutor turn with the conversation so far
#[derive(Debug, Clone)]
pub struct ChatTurnRequest {
    pub system_instruction: String,
    pub history: Vec<ChatMessage>,
    pub text: String,
    pub image: Option<InlineImage>,
}

/// Outbound contract with the model provider. One call is one attempt against one model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Returns the raw response body text
    async fn generate_structured(
        &self,
        api_key: &str,
        model: &str,
        request: &StructuredRequest,
    ) -> Result<String>;

    async fn chat(&self, api_key: &str, model: &str, request: &ChatTurnRequest) -> Result<String>;
}

/// Gemini provider implementation
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

/// Gemini-specific request structures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

impl GeminiRequest {
    fn structured(request: &StructuredRequest) -> Self {
        Self {
            system_instruction: None,
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(request.prompt.clone())],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(request.schema.clone()),
            },
        }
    }

    fn chat(request: &ChatTurnRequest) -> Self {
        let mut contents: Vec<GeminiContent> = request
            .history
            .iter()
            .map(|message| GeminiContent {
                role: Some(message.role.as_str().to_string()),
                parts: vec![GeminiPart::text(message.text.clone())],
            })
            .collect();

        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            parts.push(GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
            });
        }
        parts.push(GeminiPart::text(request.text.clone()));
        contents.push(GeminiContent {
            role: Some("user".to_string()),
            parts,
        });

        Self {
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(request.system_instruction.clone())],
            }),
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: None,
                response_schema: None,
            },
        }
    }
}

impl GeminiResponse {
    /// Concatenated text of the first candidate; empty when the model said nothing
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, api_key: &str, model: &str, body: &GeminiRequest) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        info!(
            provider = self.provider_name(),
            model = %model,
            base_url = %self.base_url,
            content_count = body.contents.len(),
            "Making LLM request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                provider = self.provider_name(),
                model = %model,
                status = %status,
                error = %error_text,
                "LLM API request failed"
            );
            return Err(anyhow::anyhow!(
                "Gemini API request failed ({}): {}",
                status,
                error_text
            ));
        }

        let gemini_response: GeminiResponse =
            response.json().await.map_err(|e| e.without_url())?;
        let response_content = gemini_response.text();

        info!(
            provider = self.provider_name(),
            model = %model,
            response_length = response_content.len(),
            "Successfully received LLM response"
        );

        Ok(response_content)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "Gemini"
    }

    async fn generate_structured(
        &self,
        api_key: &str,
        model: &str,
        request: &StructuredRequest,
    ) -> Result<String> {
        let body = GeminiRequest::structured(request);
        self.send(api_key, model, &body).await
    }

    async fn chat(&self, api_key: &str, model: &str, request: &ChatTurnRequest) -> Result<String> {
        let body = GeminiRequest::chat(request);
        self.send(api_key, model, &body).await
    }
}

/// Centralized JSON response parser with robust extraction logic
#[derive(Clone)]
pub struct JsonResponseParser;

impl JsonResponseParser {
    /// Unwrap a markdown code fence around a JSON body.
    ///
    /// Anything else is returned trimmed and left for the JSON parser to reject,
    /// so prose around the payload fails the attempt.
    pub fn extract_json_from_response(content: &str) -> String {
        let trimmed = content.trim();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return trimmed.to_string();
        }

        // Try to find JSON within markdown code blocks
        if let Some(start) = content.find("```json") {
            if let Some(end) = content[start + 7..].find("```") {
                let json_start = start + 7;
                let json_end = json_start + end;
                return content[json_start..json_end].trim().to_string();
            }
        }

        // Try to find JSON within plain code blocks
        if let Some(start) = content.find("```") {
            if let Some(end) = content[start + 3..].find("```") {
                let json_start = start + 3;
                let json_end = json_start + end;
                let potential_json = content[json_start..json_end].trim();
                if potential_json.starts_with('{') || potential_json.starts_with('[') {
                    return potential_json.to_string();
                }
            }
        }

        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use serde_json::json;

    #[test]
    fn test_structured_request_body() {
        let request = StructuredRequest {
            prompt: "Generate 2 questions".to_string(),
            schema: json!({"type": "ARRAY"}),
        };
        let body = serde_json::to_value(GeminiRequest::structured(&request)).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Generate 2 questions");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_chat_request_body_puts_image_before_text() {
        let request = ChatTurnRequest {
            system_instruction: "tutor".to_string(),
            history: vec![
                ChatMessage {
                    role: ChatRole::User,
                    text: "hi".to_string(),
                    image: None,
                },
                ChatMessage {
                    role: ChatRole::Model,
                    text: "hello".to_string(),
                    image: None,
                },
            ],
            text: "solve this".to_string(),
            image: Some(InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            }),
        };
        let body = serde_json::to_value(GeminiRequest::chat(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "tutor");
        assert_eq!(body["contents"][1]["role"], "model");
        let parts = body["contents"][2]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["text"], "solve this");
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "[{\"a\":"}, {"text": "1}]"}]}}]
        }))
        .unwrap();
        assert_eq!(response.text(), "[{\"a\":1}]");

        let empty: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_extract_json_accepts_bare_or_fenced_only() {
        let bare = r#"  [{"a": 1}, {"b": 2}]  "#;
        assert_eq!(
            JsonResponseParser::extract_json_from_response(bare),
            r#"[{"a": 1}, {"b": 2}]"#
        );

        let prose = r#"Here you go: [{"a": 1}] enjoy"#;
        assert_eq!(JsonResponseParser::extract_json_from_response(prose), prose);

        let fenced = "```json\n{\"x\": 1}\n```";
        assert_eq!(JsonResponseParser::extract_json_from_response(fenced), "{\"x\": 1}");

        let plain = "no json here";
        assert_eq!(JsonResponseParser::extract_json_from_response(plain), "no json here");
    }
}
