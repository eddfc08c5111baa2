use super::*;

#[test]
fn test_parse_api_error_google_body() {
    let error_json =
        r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
    let err = ProviderErrorHandler::parse_api_error(400, error_json).unwrap_err();
    match err {
        BotError::Provider { message, retryable } => {
            assert!(message.contains("INVALID_ARGUMENT"));
            assert!(message.contains("API key not valid."));
            assert!(!retryable);
        }
        _ => panic!("expected Provider error, got {:?}", err),
    }
}

#[test]
fn test_parse_api_error_type_field() {
    let error_json = r#"{"error": {"type": "invalid_request", "message": "bad request"}}"#;
    let err = ProviderErrorHandler::parse_api_error(400, error_json).unwrap_err();
    assert!(err.to_string().contains("invalid_request"));
}

#[test]
fn test_parse_api_error_retryable_503() {
    let error_json = r#"{"error": {"code": 503, "message": "overloaded", "status": "UNAVAILABLE"}}"#;
    let err = ProviderErrorHandler::parse_api_error(503, error_json).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn test_parse_api_error_non_json_body() {
    let err = ProviderErrorHandler::parse_api_error(500, "plain text error").unwrap_err();
    match err {
        BotError::Provider { message, retryable } => {
            assert!(message.contains("500"));
            assert!(message.contains("plain text error"));
            assert!(retryable);
        }
        _ => panic!("expected Provider error"),
    }
}

#[test]
fn test_parse_api_error_model_not_found() {
    let error_json = r#"{"error": {"code": 404, "message": "models/gemini-0 is not found", "status": "NOT_FOUND"}}"#;
    let err = ProviderErrorHandler::parse_api_error(404, error_json).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Model not found"));
    assert!(message.contains("providers.gemini.model"));
    assert!(!err.is_retryable());
}

#[test]
fn test_handle_rate_limit_with_retry_after() {
    let err = ProviderErrorHandler::handle_rate_limit(429, Some(30)).unwrap_err();
    match err {
        BotError::RateLimit { retry_after } => assert_eq!(retry_after, Some(30)),
        _ => panic!("expected RateLimit error"),
    }
}

#[test]
fn test_handle_auth_error() {
    let err = ProviderErrorHandler::handle_auth_error(403, "permission denied").unwrap_err();
    match err {
        BotError::Auth(msg) => {
            assert!(msg.contains("permission denied"));
            assert!(msg.contains("Authentication failed"));
        }
        _ => panic!("expected Auth error"),
    }
}
