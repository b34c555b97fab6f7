use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;

use crate::errors::QuizError;
use crate::fallback::{ModelChain, ModelFallbackInvoker};
use crate::llm_providers::ChatTurnRequest;
use crate::log_performance;
use crate::models::{ChatMessage, GenerationSettings, InlineImage};
use crate::prompts::{DEFAULT_CHAT_PROMPT, TUTOR_SYSTEM_INSTRUCTION};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

fn data_url_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"^data:([^;]+);base64,").expect("valid data URL pattern"))
}

/// Split a `data:<mime>;base64,` URL into MIME type and payload.
/// Bare base64 is accepted and assumed to be JPEG.
pub fn parse_image_data(image: &str) -> InlineImage {
    let image = image.trim();
    match data_url_prefix().captures(image) {
        Some(captures) => InlineImage {
            mime_type: captures[1].to_string(),
            data: image[captures[0].len()..].to_string(),
        },
        None => InlineImage {
            mime_type: DEFAULT_IMAGE_MIME.to_string(),
            data: image.to_string(),
        },
    }
}

/// Single-call tutor chat over the same fallback chain used for generation
#[derive(Clone)]
pub struct ChatService {
    invoker: ModelFallbackInvoker,
}

impl ChatService {
    pub fn new(invoker: ModelFallbackInvoker) -> Self {
        Self { invoker }
    }

    pub async fn chat(
        &self,
        settings: &GenerationSettings,
        history: &[ChatMessage],
        message: &str,
        image: Option<&str>,
    ) -> Result<String, QuizError> {
        let api_key = settings.credential().ok_or(QuizError::MissingCredential)?;

        let text = if message.trim().is_empty() {
            DEFAULT_CHAT_PROMPT.to_string()
        } else {
            message.to_string()
        };

        let request = ChatTurnRequest {
            system_instruction: TUTOR_SYSTEM_INSTRUCTION.to_string(),
            history: history.to_vec(),
            text,
            image: image
                .filter(|data| !data.trim().is_empty())
                .map(parse_image_data),
        };
        let chain = ModelChain::with_preferred(settings.preferred_model.as_deref());

        info!(
            history_len = history.len(),
            has_image = request.image.is_some(),
            models = ?chain.models(),
            "Sending tutor chat turn"
        );

        let started = Instant::now();
        let reply = self
            .invoker
            .invoke_chat("chat", api_key, &request, &chain)
            .await?;

        log_performance!("chat", duration_ms = started.elapsed().as_millis() as u64);
        Ok(reply)
    }
}
