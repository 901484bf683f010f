//! Error Types for Hangar API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - Conversion from the core `HangarError` taxonomy
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hangar_core::{HangarError, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// A foreign key points at a record that does not exist
    UnknownReference,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Backing store operation failed
    StorageError,

    /// Stored data references a record that no longer exists
    IntegrityViolation,

    /// Picture object store operation failed
    ObjectStoreError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::UnknownReference => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::InternalError
            | ErrorCode::StorageError
            | ErrorCode::IntegrityViolation
            | ErrorCode::ObjectStoreError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::UnknownReference => "Referenced record does not exist",
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageError => "Storage operation failed",
            ErrorCode::IntegrityViolation => "Stored data is inconsistent",
            ErrorCode::ObjectStoreError => "Picture storage operation failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an EntityNotFound error.
    pub fn entity_not_found(entity_type: &str, code: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with code {} not found", entity_type, code),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM CORE ERRORS
// ============================================================================

/// Convert from the core error taxonomy.
///
/// Missing records become 404, bad input 400. Everything else is a server
/// fault and is logged in full before a generic message is returned.
impl From<HangarError> for ApiError {
    fn from(err: HangarError) -> Self {
        match err {
            HangarError::Storage(StorageError::NotFound { table, code }) => {
                ApiError::entity_not_found(&table, code)
            }
            HangarError::Validation(hangar_core::ValidationError::UnknownReference {
                entity,
                field,
                code,
            }) => ApiError::new(
                ErrorCode::UnknownReference,
                format!("{} references unknown {} {}", field, entity, code),
            )
            .with_details(serde_json::json!({ "field": field, "code": code })),
            HangarError::Validation(hangar_core::ValidationError::RequiredFieldMissing {
                field,
            }) => ApiError::missing_field(&field),
            HangarError::Validation(err) => ApiError::validation_failed(err.to_string()),
            HangarError::Storage(err @ StorageError::DanglingReference { .. }) => {
                tracing::error!(error = %err, "Integrity violation");
                ApiError::new(ErrorCode::IntegrityViolation, err.to_string())
            }
            HangarError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                ApiError::from_code(ErrorCode::StorageError)
            }
            HangarError::ObjectStore(err) => {
                tracing::error!(error = %err, "Object store error");
                ApiError::from_code(ErrorCode::ObjectStoreError)
            }
            HangarError::Config(err) => {
                tracing::error!(error = %err, "Configuration error");
                ApiError::internal_error(err.to_string())
            }
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_core::{ConfigError, ObjectStoreError, ValidationError};

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::UnknownReference.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::IntegrityViolation.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::entity_not_found("airline", "iata:ba");
        assert_eq!(err.code, ErrorCode::EntityNotFound);
        assert!(err.message.contains("airline"));
        assert!(err.message.contains("iata:ba"));

        let err = ApiError::missing_field("picture");
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("picture"));
    }

    #[test]
    fn test_from_hangar_error_status() {
        let not_found: ApiError = HangarError::from(StorageError::NotFound {
            table: "country".to_string(),
            code: "zz".to_string(),
        })
        .into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let unknown_ref: ApiError = HangarError::from(ValidationError::UnknownReference {
            entity: "country".to_string(),
            field: "country".to_string(),
            code: "zz".to_string(),
        })
        .into();
        assert_eq!(unknown_ref.code, ErrorCode::UnknownReference);
        assert_eq!(unknown_ref.status_code(), StatusCode::BAD_REQUEST);

        let dangling: ApiError = HangarError::from(StorageError::DanglingReference {
            entity: "airline".to_string(),
            field: "country".to_string(),
            code: "zz".to_string(),
        })
        .into();
        assert_eq!(dangling.code, ErrorCode::IntegrityViolation);

        let backend: ApiError = HangarError::from(StorageError::LockPoisoned).into();
        assert_eq!(backend.code, ErrorCode::StorageError);

        let blob: ApiError = HangarError::from(ObjectStoreError::DeleteFailed {
            bucket: "hangar-pics".to_string(),
            reason: "denied".to_string(),
        })
        .into();
        assert_eq!(blob.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let config: ApiError = HangarError::from(ConfigError::MissingRequired {
            field: "bucket".to_string(),
        })
        .into();
        assert_eq!(config.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_unknown_reference_carries_details() {
        let err: ApiError = HangarError::from(ValidationError::UnknownReference {
            entity: "airplanemake".to_string(),
            field: "make".to_string(),
            code: "fokker".to_string(),
        })
        .into();
        assert_eq!(
            err.details,
            Some(serde_json::json!({"field": "make", "code": "fokker"}))
        );
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::entity_not_found("country", "zz");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("ENTITY_NOT_FOUND"));
        assert!(json.contains("zz"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
