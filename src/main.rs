use anyhow::Result;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use math_quiz_tutor::{
    ChatService, Config, Database, GeminiClient, HistoryService, ModelFallbackInvoker,
    QuestionSetGenerator,
    api::{AppState, create_router},
    config::LoggingConfig,
    log_system_event,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging first so configuration loading is recorded
    let _guard = setup_logging(&LoggingConfig::from_env()?)?;

    let config = Config::from_env()?;

    config.validate()?;
    log_system_event!(startup, component = "server", "Starting math quiz tutor");

    let db = Database::new(&config.database.url).await?;
    info!("Database initialized successfully");

    let client = GeminiClient::new(config.llm.base_url.clone());
    info!(base_url = %client.base_url(), "Initialized Gemini client");

    let invoker = ModelFallbackInvoker::new(Arc::new(client))
        .with_attempt_timeout(config.llm.attempt_timeout());

    let state = AppState {
        generator: QuestionSetGenerator::new(invoker.clone()),
        chat_service: ChatService::new(invoker),
        history: HistoryService::new(db, config.default_settings()),
    };

    let app = create_router(state)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
        );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn setup_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_new(&logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info,math_quiz_tutor=debug"));

    // Configure console output
    let console_layer = logging.console_enabled.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
    });

    // Configure file output (no ANSI colors for files) with daily rotation
    let (file_layer, guard) = if logging.file_enabled {
        std::fs::create_dir_all(&logging.log_directory).unwrap_or_else(|e| {
            eprintln!("Warning: Could not create logs directory: {}", e);
        });
        let file_appender = tracing_appender::rolling::daily(&logging.log_directory, "math-quiz-tutor.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(non_blocking_file);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(
        log_directory = %logging.log_directory,
        file_enabled = logging.file_enabled,
        "Logging initialized"
    );

    Ok(guard)
}
