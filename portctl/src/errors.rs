use crate::db::errors::DbError;
use crate::types::Operation;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error as ThisError;
use validator::ValidationErrors;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Malformed request body or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Request body decoded but failed field validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Resource looked up by name not found
    #[error("{resource} named '{name}' not found")]
    NotFoundByName { resource: String, name: String },

    /// The write would break a relationship that other rows depend on
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn not_found_by_name(resource: &str, name: &str) -> Self {
        Error::NotFoundByName {
            resource: resource.to_string(),
            name: name.to_string(),
        }
    }

    /// Rejection for writes against a row that allocations still reference
    pub fn still_allocated(operation: Operation, resource: &str, id: impl ToString) -> Self {
        Error::Conflict {
            message: format!(
                "Cannot {operation} {resource} with ID {}: it is referenced by existing allocations",
                id.to_string()
            ),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } | Error::NotFoundByName { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the `error` payload, without leaking internal implementation details
    pub fn user_error(&self) -> Value {
        match self {
            Error::BadRequest { message } => json!(message),
            Error::Validation(errors) => json!({
                "message": "Validation failed",
                "fields": validation_fields(errors),
            }),
            Error::NotFound { .. } | Error::NotFoundByName { .. } => json!(self.to_string()),
            Error::Conflict { message } => json!(message),
            Error::Internal { .. } | Error::Other(_) => json!("Internal server error"),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => json!("Resource not found"),
                DbError::ForeignKeyViolation { .. } => json!("Invalid reference to related resource"),
                DbError::CheckViolation { .. } => json!("Invalid data provided"),
                DbError::Other(_) => json!("Internal server error"),
            },
        }
    }
}

/// Flatten validator output into `{field: [rule, ...]}`, keyed by wire (camelCase) field name
fn validation_fields(errors: &ValidationErrors) -> Value {
    let mut fields = serde_json::Map::new();
    for (field, errs) in errors.field_errors() {
        let rules: Vec<Value> = errs
            .iter()
            .map(|e| match &e.message {
                Some(msg) => json!(msg),
                None => json!(e.code),
            })
            .collect();
        fields.insert(camel_case(&field), Value::Array(rules));
    }
    Value::Object(fields)
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) | Error::Conflict { .. } => {
                tracing::warn!("Constraint error: {}", self);
            }
            Error::BadRequest { .. } | Error::Validation(_) | Error::NotFound { .. } | Error::NotFoundByName { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.user_error() }))).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::not_found("Client", 1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::BadRequest { message: "nope".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::still_allocated(Operation::Delete, "asset", 7).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Other(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = Error::Other(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.user_error(), json!("Internal server error"));
    }

    #[test]
    fn test_validation_payload_lists_failed_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationError::new("email"));
        errors.add("name", ValidationError::new("length"));

        let payload = Error::Validation(errors).user_error();
        assert_eq!(payload["message"], "Validation failed");
        assert_eq!(payload["fields"]["email"], json!(["email"]));
        assert_eq!(payload["fields"]["name"], json!(["length"]));
    }

    #[test]
    fn test_validation_fields_use_wire_names() {
        let mut errors = ValidationErrors::new();
        errors.add("asset_name", ValidationError::new("length").with_message("assetName is required".into()));

        let payload = Error::Validation(errors).user_error();
        assert_eq!(payload["fields"]["assetName"], json!(["assetName is required"]));
    }

    #[test]
    fn test_conflict_message_names_the_operation() {
        let err = Error::still_allocated(Operation::Delete, "client", 3);
        assert_eq!(
            err.user_error(),
            json!("Cannot delete client with ID 3: it is referenced by existing allocations")
        );
    }
}
