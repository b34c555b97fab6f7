//! Output contract for generated questions.
//!
//! The provider is asked to honor [`response_schema`], but every response is
//! still checked here before it reaches the generator. Items that break the
//! contract are dropped; a response with no usable items is rejected so the
//! fallback chain moves on to the next model.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::errors::QuizError;
use crate::llm_providers::JsonResponseParser;

pub const QUESTION_SCHEMA_VERSION: u32 = 1;

pub const OPTION_COUNT: usize = 4;

/// A question object as the model produced it, before normalization
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub text: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Gemini `responseSchema`: an array of question objects
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "text": {
                    "type": "STRING",
                    "description": "Question text using Unicode math notation"
                },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Exactly 4 options labeled A., B., C., D. (Unicode math)"
                },
                "correctAnswer": {
                    "type": "STRING",
                    "description": "Correct option letter: only 'A', 'B', 'C' or 'D'"
                },
                "explanation": {
                    "type": "STRING",
                    "description": "Step-by-step explanation with clear line breaks (Unicode math)"
                },
                "difficulty": {
                    "type": "STRING",
                    "description": "'recognition', 'understanding' or 'application'"
                }
            },
            "required": ["text", "options", "correctAnswer", "explanation", "difficulty"]
        }
    })
}

/// Parse and validate a structured-generation response body
pub fn validate_response(body: &str) -> Result<Vec<RawQuestion>, QuizError> {
    let json_content = JsonResponseParser::extract_json_from_response(body);
    let value: Value = serde_json::from_str(&json_content)
        .map_err(|e| QuizError::SchemaViolation(format!("response is not JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(QuizError::SchemaViolation(format!(
                "expected an array of questions, got {}",
                json_type_name(&other)
            )));
        }
    };

    if items.is_empty() {
        return Err(QuizError::SchemaViolation("empty question array".to_string()));
    }

    let total = items.len();
    let questions: Vec<RawQuestion> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match validate_item(item) {
            Ok(question) => Some(question),
            Err(reason) => {
                warn!(
                    schema_version = QUESTION_SCHEMA_VERSION,
                    item_index = index,
                    reason = %reason,
                    "Dropping question that violates the output schema"
                );
                None
            }
        })
        .collect();

    if questions.is_empty() {
        return Err(QuizError::SchemaViolation(format!(
            "none of the {} returned items matched the question schema",
            total
        )));
    }

    Ok(questions)
}

fn validate_item(item: Value) -> Result<RawQuestion, String> {
    if !item.is_object() {
        return Err(format!("item is {}, not an object", json_type_name(&item)));
    }

    let question: RawQuestion =
        serde_json::from_value(item).map_err(|e| format!("malformed fields: {}", e))?;

    if question.text.trim().is_empty() {
        return Err("empty question text".to_string());
    }
    if question.options.len() != OPTION_COUNT {
        return Err(format!(
            "expected {} options, got {}",
            OPTION_COUNT,
            question.options.len()
        ));
    }

    Ok(question)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
