// Macros file - tracing macros are invoked by full path inside each definition

/// Standardized logging macros for consistent field names and message patterns across the application
///
/// These macros ensure:
/// - Consistent field naming conventions
/// - Appropriate logging levels for different scenarios
/// - Structured logging with context

// ============================================================================
// API Operation Logging Macros
// ============================================================================

/// Log the start of an API operation with consistent fields
#[macro_export]
macro_rules! log_api_start {
    ($operation:expr, level = $level:expr, grade = $grade:expr) => {
        tracing::debug!(
            operation = $operation,
            level = %$level,
            grade = $grade,
            "API operation started"
        );
    };
    ($operation:expr) => {
        tracing::debug!(
            operation = $operation,
            "API operation started"
        );
    };
}

/// Log successful completion of an API operation
#[macro_export]
macro_rules! log_api_success {
    ($operation:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            count = $count,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            "API operation completed: {}", $msg
        );
    };
}

/// Log API operation warnings
#[macro_export]
macro_rules! log_api_warn {
    ($operation:expr, count = $count:expr, $msg:expr) => {
        tracing::warn!(
            operation = $operation,
            count = $count,
            "API operation warning: {}", $msg
        );
    };
}

// ============================================================================
// LLM Operation Logging Macros
// ============================================================================

/// Log each step of a fallback chain
#[macro_export]
macro_rules! log_llm_operation {
    (attempt, $operation:expr, model = $model:expr, index = $index:expr, of = $of:expr) => {
        tracing::debug!(
            component = "llm_fallback",
            operation = %$operation,
            model = %$model,
            attempt = $index,
            chain_length = $of,
            "Attempting model"
        );
    };
    (success, $operation:expr, model = $model:expr, index = $index:expr) => {
        tracing::info!(
            component = "llm_fallback",
            operation = %$operation,
            model = %$model,
            attempt = $index,
            "LLM operation completed successfully"
        );
    };
    (failed, $operation:expr, model = $model:expr, error = $error:expr, last = $last:expr) => {
        tracing::warn!(
            component = "llm_fallback",
            operation = %$operation,
            model = %$model,
            error = %$error,
            last_in_chain = $last,
            "Model failed"
        );
    };
    (exhausted, $operation:expr, models = $models:expr, error = $error:expr) => {
        tracing::error!(
            component = "llm_fallback",
            operation = %$operation,
            models_tried = $models,
            error = %$error,
            "Every model in the chain failed"
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and shutdown events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Performance Logging Macros
// ============================================================================

/// Log performance metrics with consistent structure
#[macro_export]
macro_rules! log_performance {
    ($operation:expr, duration_ms = $duration:expr, count = $count:expr) => {
        tracing::debug!(
            event_type = "performance",
            operation = $operation,
            duration_ms = $duration,
            item_count = $count,
            "Performance metrics"
        );
    };
    ($operation:expr, duration_ms = $duration:expr) => {
        tracing::debug!(
            event_type = "performance",
            operation = $operation,
            duration_ms = $duration,
            "Performance metrics"
        );
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::errors::QuizError;
    use crate::models::EducationLevel;

    #[test]
    fn test_logging_macros_compile() {
        let error = QuizError::GenerationFailed;
        let operation = "generate_recognition";

        log_api_start!("generate_quiz", level = EducationLevel::High, grade = 11);
        log_api_start!("list_history");
        log_api_success!("generate_quiz", count = 20, "questions generated");
        log_api_success!("clear_history", "history cleared");
        log_api_warn!("generate_quiz", count = 1, "tiers failed");

        log_llm_operation!(attempt, operation, model = "gemini-2.5-flash", index = 1, of = 4);
        log_llm_operation!(success, operation, model = "gemini-2.5-flash", index = 1);
        log_llm_operation!(failed, operation, model = "gemini-2.5-pro", error = error, last = true);
        log_llm_operation!(exhausted, operation, models = 4, error = error);

        log_system_event!(startup, component = "server", "server starting");
        log_system_event!(config, "configuration loaded successfully");

        log_performance!("generate_quiz", duration_ms = 2500, count = 20);
        log_performance!("chat", duration_ms = 50);

        log_validation!(success, "quiz_request", "request validated");
        log_validation!(failure, "quiz_request", error = "grade out of range");
    }
}
