//! Error types shared by the service, repository and HTTP layers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// SQLSTATE raised by PostgreSQL on a UNIQUE/PRIMARY KEY violation.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised by PostgreSQL on a FOREIGN KEY violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE raised by PostgreSQL on a CHECK constraint violation.
const CHECK_VIOLATION: &str = "23514";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Invalid form token: {0}")]
    Csrf(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }

    /// Machine-readable error kind used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::InvalidReference(_) => "invalid_reference",
            Self::AlreadyExists(_) => "already_exists",
            Self::Csrf(_) => "csrf",
            Self::Template(_) => "template",
            Self::Database(_) => "database",
            Self::Migration(_) => "migration",
            Self::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) | Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::InvalidReference(_) | Self::Csrf(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) | Self::Database(_) | Self::Migration(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown constraint").to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return Self::Conflict(format!("duplicate value violates {constraint}"))
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return Self::InvalidReference(format!(
                        "referenced row does not exist ({constraint})"
                    ))
                }
                Some(CHECK_VIOLATION) => {
                    return Self::Validation(format!("value violates {constraint}"))
                }
                _ => {}
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound("row".to_string());
        }
        Self::Database(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for Error {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log, not in the response body.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
            "internal server error".to_string()
        } else {
            tracing::debug!(error = %self, kind = self.kind(), "Request rejected");
            self.to_string()
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            Error::not_found("Facility", 7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::AlreadyExists("sample_parameters".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::InvalidReference("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Validation("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(
            Error::not_found("Facility", 42).to_string(),
            "Facility 42 not found"
        );
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let response = Error::Internal("secret connection string".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal");
        assert_eq!(body["message"], "internal server error");
    }
}
