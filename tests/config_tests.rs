use math_quiz_tutor::Config;
use math_quiz_tutor::config::LoggingConfig;
use std::env;
use std::time::Duration;

const VARS: [&str; 8] = [
    "DATABASE_URL",
    "GEMINI_API_KEY",
    "GEMINI_BASE_URL",
    "GEMINI_MODEL",
    "LLM_ATTEMPT_TIMEOUT_SECS",
    "PORT",
    "HOST",
    "LOG_DIRECTORY",
];

fn clear_vars() {
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

// Environment variables are process-wide, so every case runs inside one test
#[test]
fn test_config_from_env() {
    clear_vars();

    let config = Config::from_env().unwrap();
    assert_eq!(config.database.url, "sqlite:math_quiz.db?mode=rwc");
    assert_eq!(config.llm.api_key, None);
    assert_eq!(config.llm.model, "gemini-3-flash-preview");
    assert_eq!(config.llm.attempt_timeout(), Duration::from_secs(60));
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.logging.log_directory, "logs");
    assert!(config.validate().is_ok());
    assert!(config.default_settings().credential().is_none());

    // Logging settings load without the rest of the configuration
    unsafe { env::set_var("PORT", "not-a-port") };
    let logging = LoggingConfig::from_env().unwrap();
    assert_eq!(logging.log_directory, "logs");
    assert!(Config::from_env().is_err());
    unsafe { env::remove_var("PORT") };

    unsafe {
        env::set_var("GEMINI_API_KEY", "   ");
        env::set_var("GEMINI_MODEL", "gemini-2.5-pro");
        env::set_var("LLM_ATTEMPT_TIMEOUT_SECS", "15");
        env::set_var("PORT", "8080");
    }
    let config = Config::from_env().unwrap();
    assert_eq!(config.llm.api_key, None, "blank key is treated as unset");
    assert_eq!(config.llm.model, "gemini-2.5-pro");
    assert_eq!(config.llm.attempt_timeout_secs, 15);
    assert_eq!(config.server.port, 8080);

    unsafe { env::set_var("GEMINI_API_KEY", "AIza-server-key") };
    let settings = Config::from_env().unwrap().default_settings();
    assert_eq!(settings.credential(), Some("AIza-server-key"));
    assert_eq!(settings.preferred_model.as_deref(), Some("gemini-2.5-pro"));

    unsafe { env::set_var("PORT", "not-a-port") };
    assert!(Config::from_env().is_err());
    unsafe { env::set_var("PORT", "8080") };

    unsafe { env::set_var("LLM_ATTEMPT_TIMEOUT_SECS", "soon") };
    assert!(Config::from_env().is_err());

    unsafe { env::set_var("LLM_ATTEMPT_TIMEOUT_SECS", "0") };
    let config = Config::from_env().unwrap();
    assert!(config.validate().is_err());

    clear_vars();
}
