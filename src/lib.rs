pub mod logging;

pub mod api;
pub mod chat_service;
pub mod config;
pub mod curriculum;
pub mod database;
pub mod errors;
pub mod fallback;
pub mod history_service;
pub mod llm_providers;
pub mod models;
pub mod prompts;
pub mod question_generator;
pub mod schema;

pub use chat_service::ChatService;
pub use config::Config;
pub use database::Database;
pub use errors::*;
pub use fallback::{ModelChain, ModelFallbackInvoker};
pub use history_service::HistoryService;
pub use llm_providers::{GeminiClient, JsonResponseParser, ModelClient};
pub use models::*;
pub use question_generator::QuestionSetGenerator;
