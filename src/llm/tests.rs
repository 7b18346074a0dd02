use super::*;

#[tokio::test]
async fn test_mock_returns_fixed_answer_and_records_prompt() {
    let backend = MockBackend::new("EXPECTED ANSWER");

    let response = backend.generate("hello").await.unwrap();

    assert_eq!(response.text, "EXPECTED ANSWER");
    assert_eq!(response.model, mock::MOCK_MODEL);
    assert!(response.usage.is_none());
    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.last_prompt().as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_mock_script_is_consumed_in_order() {
    let backend = MockBackend::new("fallback").with_script(["4", "2.5"]);

    assert_eq!(backend.generate("a").await.unwrap().text, "4");
    assert_eq!(backend.generate("b").await.unwrap().text, "2.5");
    assert_eq!(backend.generate("c").await.unwrap().text, "fallback");
    assert_eq!(backend.prompts(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_mock_fail_marker_only_affects_matching_prompts() {
    let backend = MockBackend::new("ok").fail_when_prompt_contains("BOOM");

    assert!(backend.generate("fine").await.is_ok());
    let err = backend.generate("this goes BOOM").await.unwrap_err();
    assert!(matches!(err, LlmError::Provider { .. }));
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_failing_mock_always_errors() {
    let backend = MockBackend::failing();
    assert!(backend.generate("anything").await.is_err());
}

#[test]
fn test_llm_error_display() {
    let err = LlmError::Timeout { seconds: 30 };
    assert_eq!(err.to_string(), "generation timed out after 30s");

    let err = LlmError::EmptyResponse {
        model: "m".to_string(),
    };
    assert!(err.to_string().contains("empty response"));
}

#[test]
fn test_genai_backend_reports_model() {
    let backend = GenaiBackend::new("gemini-2.5-flash");
    assert_eq!(backend.model(), "gemini-2.5-flash");
}
