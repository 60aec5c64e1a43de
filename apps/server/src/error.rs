//! Error types for the DentalDesk server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// One failed field in a request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: Vec<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { Vec::new() } else { vec![path] },
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error")]
    Validation(Vec<FieldError>),

    #[error("Invalid ID: {0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &str) -> Self {
        Error::NotFound(format!("{entity} not found"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidId(_) | Error::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            // A duplicate username is reported as a plain bad request.
            Error::Conflict(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value ({})", e.code));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        // Struct-level checks land under `__all__`.
        for field in &mut fields {
            if field.path.first().map(String::as_str) == Some("__all__") {
                field.path.clear();
            }
        }
        fields.sort_by(|a, b| a.path.cmp(&b.path));
        Error::Validation(fields)
    }
}

impl From<dentaldesk_models::PatchError> for Error {
    fn from(err: dentaldesk_models::PatchError) -> Self {
        Error::Validation(vec![FieldError::new("", err.to_string())])
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Error::Validation(errors) => json!({
                "message": "Validation error",
                "errors": errors,
            }),
            Error::InvalidId(_) => json!({ "message": "Invalid ID" }),
            Error::Database(e) => {
                tracing::error!(error = %e, "Database error");
                json!({ "message": self.to_string() })
            }
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                json!({ "message": self.to_string() })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    #[test]
    fn validation_errors_keep_field_and_message() {
        let err: Error = Form {
            name: String::new(),
        }
        .validate()
        .unwrap_err()
        .into();
        let Error::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields, vec![FieldError::new("name", "name is required")]);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(Error::not_found("Patient").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::not_found("Patient").to_string(), "Patient not found");
        assert_eq!(
            Error::Conflict("Username already exists".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
