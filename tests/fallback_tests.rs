mod common;

use common::{Reply, ScriptedClient, invoker, questions_json};
use math_quiz_tutor::llm_providers::{ChatTurnRequest, StructuredRequest};
use math_quiz_tutor::schema::response_schema;
use math_quiz_tutor::{ModelChain, QuizError};
use std::time::Duration;

fn structured_request() -> StructuredRequest {
    StructuredRequest {
        prompt: "Generate 3 [recognition] level math questions".to_string(),
        schema: response_schema(),
    }
}

fn chat_request(text: &str) -> ChatTurnRequest {
    ChatTurnRequest {
        system_instruction: "tutor".to_string(),
        history: Vec::new(),
        text: text.to_string(),
        image: None,
    }
}

#[tokio::test]
async fn test_third_model_succeeds_after_two_failures() {
    let client = ScriptedClient::new(|model, _| match model {
        "m1" => Reply::Fail("503 Service Unavailable".to_string()),
        "m2" => Reply::Text("definitely not json".to_string()),
        _ => Reply::Text(questions_json(3, "recognition")),
    });
    let chain = ModelChain::new(["m1", "m2", "m3", "m4"]);

    let questions = invoker(client.clone())
        .invoke_structured("test", "key", &structured_request(), &chain)
        .await
        .unwrap();

    assert_eq!(questions.len(), 3);
    assert_eq!(client.models_called(), vec!["m1", "m2", "m3"]);
}

#[tokio::test]
async fn test_empty_array_triggers_fallback() {
    let client = ScriptedClient::new(|model, _| match model {
        "m1" => Reply::Text("[]".to_string()),
        _ => Reply::Text(questions_json(1, "recognition")),
    });
    let chain = ModelChain::new(["m1", "m2"]);

    let questions = invoker(client.clone())
        .invoke_structured("test", "key", &structured_request(), &chain)
        .await
        .unwrap();

    assert_eq!(questions.len(), 1);
    assert_eq!(client.models_called(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn test_last_model_rate_limited_is_provider_exhausted() {
    let client = ScriptedClient::new(|model, _| match model {
        "m1" => Reply::Fail("connection reset".to_string()),
        _ => Reply::Fail("Gemini API request failed (429 Too Many Requests): quota".to_string()),
    });
    let chain = ModelChain::new(["m1", "m2"]);

    let error = invoker(client.clone())
        .invoke_structured("test", "key", &structured_request(), &chain)
        .await
        .unwrap_err();

    assert_eq!(error, QuizError::ProviderExhausted);
    assert_eq!(client.models_called(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn test_only_the_last_error_is_classified() {
    // An earlier 429 does not make the final failure a rate limit
    let client = ScriptedClient::new(|model, _| match model {
        "m1" => Reply::Fail("429 RESOURCE_EXHAUSTED".to_string()),
        _ => Reply::Fail("dns error: no such host".to_string()),
    });
    let chain = ModelChain::new(["m1", "m2"]);

    let error = invoker(client)
        .invoke_structured("test", "key", &structured_request(), &chain)
        .await
        .unwrap_err();

    match error {
        QuizError::ConnectionFailed(message) => assert!(message.contains("no such host")),
        other => panic!("expected ConnectionFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_last_model_schema_violation() {
    let client = ScriptedClient::new(|_, _| Reply::Text("{\"oops\": true}".to_string()));
    let chain = ModelChain::new(["m1", "m2"]);

    let error = invoker(client.clone())
        .invoke_structured("test", "key", &structured_request(), &chain)
        .await
        .unwrap_err();

    assert!(matches!(error, QuizError::SchemaViolation(_)));
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn test_each_model_attempted_once_with_credential() {
    let client = ScriptedClient::new(|_, _| Reply::Fail("500".to_string()));
    let chain = ModelChain::with_preferred(Some("gemini-2.5-pro"));

    let _ = invoker(client.clone())
        .invoke_structured("test", "secret-key", &structured_request(), &chain)
        .await;

    let calls = client.calls();
    assert_eq!(
        client.models_called(),
        vec![
            "gemini-2.5-pro",
            "gemini-3-flash-preview",
            "gemini-3-pro-preview",
            "gemini-2.5-flash"
        ]
    );
    assert!(calls.iter().all(|call| call.api_key == "secret-key"));
}

#[tokio::test]
async fn test_hung_attempt_times_out_and_falls_back() {
    let client = ScriptedClient::new(|model, _| match model {
        "slow" => Reply::Hang,
        _ => Reply::Text(questions_json(2, "recognition")),
    });
    let chain = ModelChain::new(["slow", "fast"]);

    let questions = invoker(client.clone())
        .with_attempt_timeout(Duration::from_millis(50))
        .invoke_structured("test", "key", &structured_request(), &chain)
        .await
        .unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(client.models_called(), vec!["slow", "fast"]);
}

#[tokio::test]
async fn test_chat_accepts_empty_reply() {
    let client = ScriptedClient::new(|_, _| Reply::Text(String::new()));
    let chain = ModelChain::new(["m1", "m2"]);

    let reply = invoker(client.clone())
        .invoke_chat("chat", "key", &chat_request("hello"), &chain)
        .await
        .unwrap();

    assert_eq!(reply, "");
    assert_eq!(client.models_called(), vec!["m1"]);
}

#[tokio::test]
async fn test_chat_falls_back_then_classifies() {
    let client = ScriptedClient::new(|model, _| match model {
        "m1" => Reply::Fail("timeout".to_string()),
        _ => Reply::Fail("RESOURCE_EXHAUSTED".to_string()),
    });
    let chain = ModelChain::new(["m1", "m2"]);

    let error = invoker(client)
        .invoke_chat("chat", "key", &chat_request("hello"), &chain)
        .await
        .unwrap_err();

    assert_eq!(error, QuizError::ProviderExhausted);
}

#[tokio::test]
async fn test_empty_chain_fails_without_calls() {
    let client = ScriptedClient::new(|_, _| Reply::Text("unused".to_string()));
    let chain = ModelChain::new(Vec::<String>::new());

    let error = invoker(client.clone())
        .invoke_chat("chat", "key", &chat_request("hello"), &chain)
        .await
        .unwrap_err();

    assert!(matches!(error, QuizError::ConnectionFailed(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_credential_is_scrubbed_from_provider_errors() {
    // A key that happens to contain "429" must not look like a rate limit either
    let client = ScriptedClient::new(|_, _| {
        Reply::Fail("error sending request for url (https://host/v1beta?key=AIza429SECRET)".to_string())
    });
    let chain = ModelChain::new(["m1", "m2"]);

    let error = invoker(client)
        .invoke_structured("test", "AIza429SECRET", &structured_request(), &chain)
        .await
        .unwrap_err();

    match error {
        QuizError::ConnectionFailed(message) => {
            assert!(!message.contains("AIza429SECRET"));
            assert!(message.contains("[redacted]"));
        }
        other => panic!("expected ConnectionFailed, got: {other:?}"),
    }
}
