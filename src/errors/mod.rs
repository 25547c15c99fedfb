//! Errors shared by the repository, search index and HTTP handlers.
//!
//! Every [`AppError`] knows its HTTP status and stable code, and renders into the `{success: false, error, revisionId}` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::pin::PinError;

/// Stable codes returned in `error.code`.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_PIN: &str = "INVALID_PIN";
    pub const INVALID_FIELD: &str = "INVALID_FIELD";
    pub const DUPLICATE: &str = "DUPLICATE";
    pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const SEARCH_ERROR: &str = "SEARCH_ERROR";
    pub const EXPORT_ERROR: &str = "EXPORT_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Failure of any staff operation.
#[derive(Debug)]
pub enum AppError {
    /// Missing or wrong access key
    Unauthorized(String),
    /// No record with the requested id
    NotFound(String),
    /// Request rejected before storage, e.g. a blank name
    Validation(String),
    /// Malformed personal identification number
    InvalidPin(PinError),
    /// Unknown field in a single-cell arrangement edit
    InvalidField(String),
    /// Unique constraint violation, e.g. a PIN already on file
    Duplicate(String),
    /// Stale `expectedVersion` on a profile update
    Conflict {
        message: String,
        current_version: i64,
    },
    /// SQLite failure
    Database(String),
    /// Tantivy failure
    Search(String),
    /// Spreadsheet export error
    Export(String),
    /// Anything else unexpected
    Internal(String),
    /// Unparseable request body
    BadRequest(String),
}

impl AppError {
    /// HTTP status for the envelope.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPin(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidField(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable code from [`codes`].
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::InvalidPin(_) => codes::INVALID_PIN,
            AppError::InvalidField(_) => codes::INVALID_FIELD,
            AppError::Duplicate(_) => codes::DUPLICATE,
            AppError::Conflict { .. } => codes::VERSION_MISMATCH,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Search(_) => codes::SEARCH_ERROR,
            AppError::Export(_) => codes::EXPORT_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Human-readable message for the envelope.
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidPin(err) => err.to_string(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::InvalidField(msg)
            | AppError::Duplicate(msg)
            | AppError::Database(msg)
            | AppError::Search(msg)
            | AppError::Export(msg)
            | AppError::Internal(msg)
            | AppError::BadRequest(msg) => msg.clone(),
        }
    }

    /// Map a unique-constraint violation to [`AppError::Duplicate`].
    pub fn unique_violation_or(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Duplicate(message.into())
            }
            _ => err.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<PinError> for AppError {
    fn from(err: PinError) -> Self {
        AppError::InvalidPin(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<tantivy::TantivyError> for AppError {
    fn from(err: tantivy::TantivyError) -> Self {
        tracing::error!("Search error: {:?}", err);
        AppError::Search(format!("Search error: {}", err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        tracing::error!("Export error: {:?}", err);
        AppError::Export(format!("Export error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// The `error` object of a failed response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Body of a failed response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        let details = match error {
            AppError::Conflict {
                current_version, ..
            } => Some(serde_json::json!({ "currentVersion": current_version })),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
            revision_id,
        }
    }
}

/// An error paired with the revision id current when it happened.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        AppErrorWithRevision {
            error: self,
            revision_id: 0,
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_error_maps_to_bad_request() {
        let err: AppError = PinError::Length(5).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), codes::INVALID_PIN);
        assert!(err.message().contains("14"));
    }

    #[test]
    fn test_conflict_details() {
        let err = AppError::Conflict {
            message: "stale".to_string(),
            current_version: 4,
        };
        let body = ErrorResponse::new(&err, 9);
        assert!(!body.success);
        assert_eq!(body.error.code, codes::VERSION_MISMATCH);
        assert_eq!(body.error.details.unwrap()["currentVersion"], 4);
        assert_eq!(body.revision_id, 9);
    }

    #[test]
    fn test_invalid_field_envelope() {
        let body = ErrorResponse::new(&AppError::InvalidField("Unknown field".to_string()), 1);
        assert_eq!(body.error.code, codes::INVALID_FIELD);
        assert!(body.error.details.is_none());
    }
}
