//! Serde tests for core types.
//!
//! These pin the JSON wire names that callers and persisted files rely on.

use serde_json::json;

use crate::{
    BackendKind, BackendStatus, Candidate, Content, CountTokensResponse, Credentials,
    EmbedContentResponse, ExecutorConfig, ExecutorStatus, FinishReason, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, Role,
};

// ============================================================================
// BackendKind Serde Tests
// ============================================================================

#[test]
fn test_backend_kind_deserialize_lowercase() {
    let test_cases = vec![
        (r#""gemini""#, BackendKind::Gemini),
        (r#""openai""#, BackendKind::OpenAi),
    ];

    for (json, expected) in test_cases {
        let result: BackendKind = serde_json::from_str(json).unwrap();
        assert_eq!(result, expected, "Failed for {}", json);
    }
}

#[test]
fn test_backend_kind_invalid_deserialize() {
    let result: Result<BackendKind, _> = serde_json::from_str(r#""invalid_backend""#);
    assert!(result.is_err());
}

// ============================================================================
// Content Serde Tests
// ============================================================================

#[test]
fn test_request_uses_camel_case() {
    let request = GenerateContentRequest::prompt("m", "Hello")
        .with_system_instruction("Be brief")
        .with_generation_config(GenerationConfig {
            max_output_tokens: Some(64),
            ..GenerationConfig::default()
        });

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "m");
    assert_eq!(value["contents"][0]["role"], "user");
    assert_eq!(value["contents"][0]["parts"][0]["text"], "Hello");
    assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be brief");
    assert_eq!(value["generationConfig"]["maxOutputTokens"], 64);
    assert!(value["generationConfig"].get("temperature").is_none());
}

#[test]
fn test_request_omits_empty_optionals() {
    let request = GenerateContentRequest::prompt("m", "Hi");
    let value = serde_json::to_value(&request).unwrap();
    assert!(value.get("systemInstruction").is_none());
    assert!(value.get("generationConfig").is_none());
}

#[test]
fn test_response_defaults_when_fields_missing() {
    let json = json!({
        "candidates": [
            { "content": { "role": "model", "parts": [{ "text": "Hi" }] } }
        ]
    });

    let response: GenerateContentResponse = serde_json::from_value(json).unwrap();
    let candidate = &response.candidates[0];
    assert_eq!(candidate.finish_reason, FinishReason::Stop);
    assert_eq!(candidate.index, 0);
    assert_eq!(candidate.content.role, Role::Model);
    assert_eq!(response.usage_metadata.total_token_count, 0);
}

#[test]
fn test_response_missing_candidates_is_empty() {
    let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
    assert!(response.candidates.is_empty());
}

#[test]
fn test_finish_reason_names() {
    let cases = [
        ("STOP", FinishReason::Stop),
        ("MAX_TOKENS", FinishReason::MaxTokens),
        ("SAFETY", FinishReason::Safety),
        ("RECITATION", FinishReason::Recitation),
        ("FINISH_REASON_UNSPECIFIED", FinishReason::Other),
        ("BLOCKLIST", FinishReason::Other),
    ];

    for (name, expected) in cases {
        let parsed: FinishReason = serde_json::from_value(json!(name)).unwrap();
        assert_eq!(parsed, expected, "Failed for {}", name);
    }
}

#[test]
fn test_usage_metadata_wire_names() {
    let json = json!({
        "candidates": [{ "content": { "parts": [{ "text": "x" }] }, "finishReason": "MAX_TOKENS", "index": 2 }],
        "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 4, "totalTokenCount": 7 }
    });

    let response: GenerateContentResponse = serde_json::from_value(json).unwrap();
    assert_eq!(response.usage_metadata.prompt_token_count, 3);
    assert_eq!(response.usage_metadata.candidates_token_count, 4);
    assert_eq!(response.usage_metadata.total_token_count, 7);
    assert_eq!(response.candidates[0].finish_reason, FinishReason::MaxTokens);
    assert_eq!(response.candidates[0].index, 2);
}

#[test]
fn test_candidate_serializes_finish_reason() {
    let candidate = Candidate {
        content: Content::model("ok"),
        finish_reason: FinishReason::Safety,
        index: 0,
    };
    let value = serde_json::to_value(&candidate).unwrap();
    assert_eq!(value["finishReason"], "SAFETY");
}

#[test]
fn test_count_tokens_defaults_to_zero() {
    let response: CountTokensResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(response.total_tokens, 0);

    let response: CountTokensResponse = serde_json::from_str(r#"{"totalTokens": 12}"#).unwrap();
    assert_eq!(response.total_tokens, 12);
}

#[test]
fn test_embed_response_shape() {
    let response = EmbedContentResponse::single(vec![1.0, 2.0]);
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value, json!({ "embeddings": [{ "values": [1.0, 2.0] }] }));
}

// ============================================================================
// Credentials Serde Tests
// ============================================================================

#[test]
fn test_credentials_snake_case_file_format() {
    let json = r#"{
        "access_token": "abc",
        "refresh_token": "def",
        "token_type": "Bearer",
        "expires_in": 3599,
        "expires_at": 1735000000000
    }"#;

    let creds: Credentials = serde_json::from_str(json).unwrap();
    assert_eq!(creds.access_token, "abc");
    assert_eq!(creds.refresh_token.as_deref(), Some("def"));
    assert_eq!(creds.expires_in, Some(3599));
    assert_eq!(creds.expires_at, Some(1_735_000_000_000));
}

#[test]
fn test_credentials_minimal_file() {
    let creds: Credentials = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
    assert_eq!(creds.token_type, "Bearer");
    assert!(creds.refresh_token.is_none());
    assert!(creds.expires_at.is_none());
    assert!(!creds.is_expired());

    let value = serde_json::to_value(&creds).unwrap();
    assert!(value.get("refresh_token").is_none());
    assert!(value.get("expires_at").is_none());
}

// ============================================================================
// Config & Status Serde Tests
// ============================================================================

#[test]
fn test_executor_config_partial_json_uses_defaults() {
    let config: ExecutorConfig =
        serde_json::from_str(r#"{"max_retries": 5, "fallback_backend": "openai"}"#).unwrap();
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.retry_delay_ms, 1000);
    assert_eq!(config.fallback_backend, Some(BackendKind::OpenAi));
    assert!(!config.enable_fallback);
}

#[test]
fn test_status_skips_missing_fallback() {
    let status = ExecutorStatus {
        primary: BackendStatus::new(BackendKind::Gemini, true),
        fallback: None,
    };
    let value = serde_json::to_value(status).unwrap();
    assert_eq!(value["primary"]["identity"], "gemini");
    assert_eq!(value["primary"]["available"], true);
    assert!(value.get("fallback").is_none());
}
