//! Request error types for the generated CRUD endpoints.
//!
//! Authorization failures map to 403 and name the offending field or
//! action; validation failures map to 400 and are raised before any
//! mutation. Store failures surface as 500. All bodies are
//! `{"error": ...}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

/// Error type for request handling failures.
#[derive(Debug, Clone)]
pub struct RestError {
    /// The kind of failure.
    pub kind: RestErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl RestError {
    /// Create a new request error.
    pub fn new(kind: RestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    // =========================================================================
    // AUTHORIZATION ERRORS (403)
    // =========================================================================

    /// Caller may not view the field.
    pub fn field_not_visible(field: &str) -> Self {
        Self::new(
            RestErrorKind::FieldNotVisible,
            format!("User does not have permission to view field '{}'", field),
        )
    }

    /// Caller may not create items.
    pub fn add_not_allowed() -> Self {
        Self::new(
            RestErrorKind::AddNotAllowed,
            "User does not have permission to add items",
        )
    }

    /// Caller may not modify the field.
    pub fn modify_not_allowed(field: &str) -> Self {
        Self::new(
            RestErrorKind::ModifyNotAllowed,
            format!("User does not have permission to modify field '{}'", field),
        )
    }

    /// Caller may not delete items.
    pub fn remove_not_allowed() -> Self {
        Self::new(
            RestErrorKind::RemoveNotAllowed,
            "User does not have permission to remove items",
        )
    }

    // =========================================================================
    // VALIDATION ERRORS (400)
    // =========================================================================

    /// Sort field does not exist on the model.
    pub fn unknown_sort_field(model: &str, field: &str) -> Self {
        Self::new(
            RestErrorKind::UnknownSortField,
            format!("Cannot sort by unknown field '{}' on model '{}'", field, model),
        )
    }

    /// A reserved query parameter failed to parse.
    pub fn invalid_parameter(name: &str, value: &str) -> Self {
        Self::new(
            RestErrorKind::InvalidParameter,
            format!("Invalid value '{}' for parameter '{}'", value, name),
        )
    }

    /// Payload references a field the model does not have.
    pub fn unknown_field(model: &str, field: &str) -> Self {
        Self::new(
            RestErrorKind::UnknownField,
            format!("Model '{}' has no field '{}'", model, field),
        )
    }

    /// Payload value does not match the field type.
    pub fn invalid_value(field: &str, expected: &str) -> Self {
        Self::new(
            RestErrorKind::InvalidValue,
            format!("Invalid value for field '{}': expected {}", field, expected),
        )
    }

    /// Payload value is outside the field's choice set.
    pub fn value_not_in_choices(field: &str, choices: &[String]) -> Self {
        Self::new(
            RestErrorKind::InvalidValue,
            format!(
                "Value for field '{}' is not one of the allowed choices: {:?}",
                field, choices
            ),
        )
    }

    /// Request body is not a JSON object.
    pub fn payload_not_object() -> Self {
        Self::new(
            RestErrorKind::InvalidValue,
            "Request body must be a JSON object",
        )
    }

    // =========================================================================
    // BACKEND ERRORS (500)
    // =========================================================================

    /// The persistence layer failed.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(RestErrorKind::Backend, message)
    }

    /// HTTP status the error maps to.
    pub fn status(&self) -> StatusCode {
        match self.kind {
            RestErrorKind::FieldNotVisible
            | RestErrorKind::AddNotAllowed
            | RestErrorKind::ModifyNotAllowed
            | RestErrorKind::RemoveNotAllowed => StatusCode::FORBIDDEN,
            RestErrorKind::UnknownSortField
            | RestErrorKind::InvalidParameter
            | RestErrorKind::UnknownField
            | RestErrorKind::InvalidValue => StatusCode::BAD_REQUEST,
            RestErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RestError {}

impl From<StoreError> for RestError {
    fn from(e: StoreError) -> Self {
        RestError::backend(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self.message, "request failed");
        }
        (self.status(), Json(json!({ "error": self.message }))).into_response()
    }
}

/// Categories of request errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestErrorKind {
    // Authorization errors
    /// Caller may not view a requested field.
    FieldNotVisible,
    /// Caller may not create items.
    AddNotAllowed,
    /// Caller may not modify a payload field.
    ModifyNotAllowed,
    /// Caller may not delete items.
    RemoveNotAllowed,

    // Validation errors
    /// Sort field does not exist on the model.
    UnknownSortField,
    /// Reserved query parameter failed to parse.
    InvalidParameter,
    /// Payload field does not exist on the model.
    UnknownField,
    /// Payload value fails the field type or choice constraint.
    InvalidValue,

    // Backend errors
    /// Persistence layer failure.
    Backend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_errors_are_forbidden() {
        assert_eq!(
            RestError::field_not_visible("total").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(RestError::add_not_allowed().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_errors_are_bad_request() {
        assert_eq!(
            RestError::unknown_sort_field("invoice", "vat").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RestError::invalid_value("total", "a number").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn messages_name_the_field() {
        let err = RestError::modify_not_allowed("status");
        assert!(err.message.contains("status"));
    }
}
