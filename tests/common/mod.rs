#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use math_quiz_tutor::llm_providers::{ChatTurnRequest, ModelClient, StructuredRequest};
use math_quiz_tutor::{Difficulty, ModelFallbackInvoker};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What a scripted model does for one call
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
    Hang,
    /// Wait, then behave like the inner reply
    Slow(Duration, Box<Reply>),
}

type Script = dyn Fn(&str, &str) -> Reply + Send + Sync;

/// A model client whose answers are decided by a closure over (model, prompt text)
pub struct ScriptedClient {
    script: Box<Script>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub model: String,
    pub prompt: String,
    pub api_key: String,
    pub started: Instant,
}

impl ScriptedClient {
    pub fn new(script: impl Fn(&str, &str) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.model).collect()
    }

    async fn respond(&self, api_key: &str, model: &str, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            prompt: prompt.to_string(),
            api_key: api_key.to_string(),
            started: Instant::now(),
        });

        let mut reply = (self.script)(model, prompt);
        while let Reply::Slow(delay, then) = reply {
            tokio::time::sleep(delay).await;
            reply = *then;
        }

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(message) => Err(anyhow::anyhow!(message)),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(anyhow::anyhow!("hung call finished"))
            }
            Reply::Slow(..) => unreachable!("slow replies are unwrapped above"),
        }
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn provider_name(&self) -> &'static str {
        "Scripted"
    }

    async fn generate_structured(
        &self,
        api_key: &str,
        model: &str,
        request: &StructuredRequest,
    ) -> Result<String> {
        self.respond(api_key, model, &request.prompt).await
    }

    async fn chat(&self, api_key: &str, model: &str, request: &ChatTurnRequest) -> Result<String> {
        self.respond(api_key, model, &request.text).await
    }
}

pub fn invoker(client: Arc<ScriptedClient>) -> ModelFallbackInvoker {
    ModelFallbackInvoker::new(client).with_attempt_timeout(Duration::from_secs(5))
}

/// Tier named in a generation prompt, e.g. "[understanding]"
pub fn tier_of(prompt: &str) -> Option<Difficulty> {
    Difficulty::ALL
        .into_iter()
        .find(|difficulty| prompt.contains(&format!("[{}]", difficulty.as_str())))
}

/// Question count requested by a generation prompt ("Generate 12 [...")
pub fn count_of(prompt: &str) -> usize {
    prompt
        .strip_prefix("Generate ")
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// A well-formed model response with `count` questions
pub fn questions_json(count: usize, difficulty: &str) -> String {
    let letters = ["A", "B", "C", "D"];
    let items: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "text": format!("Question {} ({}): {} + {} = ?", i, difficulty, i, i),
                "options": [
                    format!("A. {}", 2 * i),
                    format!("B. {}", 2 * i + 1),
                    format!("C. {}", 2 * i + 2),
                    format!("D. {}", 2 * i + 3),
                ],
                "correctAnswer": letters[i % 4],
                "explanation": format!("- Step: {} + {} = {}\n=> A", i, i, 2 * i),
                "difficulty": difficulty,
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

pub fn slow(delay_ms: u64, reply: Reply) -> Reply {
    Reply::Slow(Duration::from_millis(delay_ms), Box::new(reply))
}

/// Answers every tier prompt with exactly the requested number of questions
pub fn answer_requested(_model: &str, prompt: &str) -> Reply {
    let difficulty = tier_of(prompt).map(|d| d.as_str()).unwrap_or("recognition");
    Reply::Text(questions_json(count_of(prompt), difficulty))
}
