//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management: validators, the auth middleware, and the task
//! repository all return `AppError` values which are translated into HTTP responses
//! at a single boundary.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return
//! `Result<_, AppError>` and have failures serialized as the API's standard
//! `{"success": false, "message": ..., "errors": [...]}` body. `From` implementations
//! for `sqlx::Error`, `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError` let
//! handlers propagate library failures with `?`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// A single field-level validation failure, serialized into the `errors`
/// array of a 400 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Request payload or query string failed schema checks (HTTP 400).
    /// Carries the per-field detail array.
    Validation(Vec<FieldError>),
    /// Malformed request outside of field validation, e.g. a task id that is
    /// not a valid UUID (HTTP 400). Distinct from `NotFound` on purpose.
    BadRequest(String),
    /// Authentication failed or is missing (HTTP 401). The message is always
    /// generic; detail (expired vs. malformed token, unknown email vs. wrong
    /// password) is logged server-side only.
    Unauthorized(String),
    /// The requested resource does not exist for this owner (HTTP 404).
    /// Owner mismatches surface as this variant, never as 403.
    NotFound(String),
    /// A uniqueness constraint was violated, e.g. registering an email that
    /// is already taken (HTTP 409).
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500). The message is suppressed
    /// from clients in release builds.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                write!(f, "Validation failed ({} errors)", errors.len())
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": errors,
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "success": false,
                "message": msg,
            })),
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                // Full detail only in development builds; production clients
                // get a generic message.
                let client_message = if cfg!(debug_assertions) {
                    msg.as_str()
                } else {
                    "Something went wrong"
                };
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": client_message,
                }))
            }
        }
    }
}

/// Translates JSON body deserialization failures (malformed JSON, wrong
/// field types such as a non-timestamp `dueDate`) into the standard error
/// envelope instead of actix-web's plain-text default. Registered through
/// `web::JsonConfig` in the app factory.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to 404, unique-constraint violations map to 409,
/// everything else is an internal error.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Resource already exists".into())
            }
            _ => AppError::Internal(error.to_string()),
        }
    }
}

/// JWT processing failures (verification at the auth gate) become 401s.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::warn!("token error: {}", error);
        AppError::Unauthorized("Invalid or expired token".into())
    }
}

/// Hashing failures are server-side problems, never the client's fault.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = resp
            .into_body()
            .try_into_bytes()
            .ok()
            .expect("in-memory body");
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation(vec![]).status_code(), 400);
        assert_eq!(AppError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
        assert_eq!(AppError::Conflict("x".into()).status_code(), 409);
        assert_eq!(AppError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_validation_body_carries_field_errors() {
        let error = AppError::Validation(vec![
            FieldError::new("title", "Title is required"),
            FieldError::new("priority", "Priority must be one of: low, med, high"),
        ]);
        let body = body_json(error.error_response());
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][0]["field"], "title");
    }

    #[test]
    fn test_not_found_body_shape() {
        let body = body_json(AppError::NotFound("Task not found".into()).error_response());
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Task not found");
        assert!(body.get("errors").is_none());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
