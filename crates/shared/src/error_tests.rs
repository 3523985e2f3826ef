use super::*;

#[test]
fn test_app_error_status_codes() {
    assert_eq!(AppError::NotFound("test".into()).status_code(), 404);
    assert_eq!(AppError::Validation("test".into()).status_code(), 400);
    assert_eq!(AppError::PayloadTooLarge("test".into()).status_code(), 413);
    assert_eq!(AppError::Database("test".into()).status_code(), 500);
    assert_eq!(AppError::Storage("test".into()).status_code(), 500);
    assert_eq!(
        AppError::ServiceUnavailable("test".into()).status_code(),
        503
    );
    assert_eq!(AppError::Internal("test".into()).status_code(), 500);
}

#[test]
fn test_app_error_error_codes() {
    assert_eq!(AppError::NotFound("test".into()).error_code(), "NOT_FOUND");
    assert_eq!(
        AppError::Validation("test".into()).error_code(),
        "VALIDATION_ERROR"
    );
    assert_eq!(
        AppError::PayloadTooLarge("test".into()).error_code(),
        "PAYLOAD_TOO_LARGE"
    );
    assert_eq!(
        AppError::Database("test".into()).error_code(),
        "DATABASE_ERROR"
    );
    assert_eq!(
        AppError::Storage("test".into()).error_code(),
        "STORAGE_ERROR"
    );
    assert_eq!(
        AppError::ServiceUnavailable("test".into()).error_code(),
        "SERVICE_BUSY"
    );
    assert_eq!(
        AppError::Internal("test".into()).error_code(),
        "INTERNAL_ERROR"
    );
}

#[test]
fn test_app_error_display() {
    assert_eq!(
        format!("{}", AppError::NotFound("msg".into())),
        "Not found: msg"
    );
    assert_eq!(
        format!("{}", AppError::Validation("msg".into())),
        "Validation error: msg"
    );
    assert_eq!(
        format!("{}", AppError::ServiceUnavailable("msg".into())),
        "Service unavailable: msg"
    );
}

#[test]
fn test_client_facing_errors() {
    assert!(AppError::Validation("content is required".into()).is_client_facing());
    assert!(AppError::NotFound("post 1".into()).is_client_facing());
    assert!(!AppError::Database("relation does not exist".into()).is_client_facing());
    assert!(!AppError::ServiceUnavailable("401 from provider".into()).is_client_facing());
}
