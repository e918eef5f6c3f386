//! Remote failures and their user-facing form.

use std::collections::BTreeMap;

use campusgate_core::DomainError;
use serde_json::Value;
use thiserror::Error;

/// Shown when neither the server nor the flow has anything better to say.
pub const GENERIC_MESSAGE: &str = "Something went wrong";

/// Shown for transport failures in user-facing flows.
pub const NETWORK_MESSAGE: &str = "Network error, please try again later";

/// Failure of a call to the remote API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 401. The persisted credential is no longer valid.
    #[error("unauthorized")]
    Unauthorized { message: Option<String> },

    /// Any other non-2xx response.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
        field_errors: BTreeMap<String, String>,
    },

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build from a non-2xx status and its raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let message = server_message(&payload);

        if status == 401 {
            return ApiError::Unauthorized { message };
        }

        ApiError::Rejected {
            status,
            message,
            field_errors: field_errors(&payload),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Message the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Rejected { message, .. } => {
                message.as_deref()
            }
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    /// Server message, else the transport message, else the generic fallback.
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Network(msg) | ApiError::Decode(msg) if !msg.is_empty() => msg.clone(),
            other => other
                .server_message()
                .unwrap_or(GENERIC_MESSAGE)
                .to_string(),
        }
    }
}

/// `error`, then `message`, then `detail`; string values only.
fn server_message(payload: &Value) -> Option<String> {
    ["error", "message", "detail"]
        .iter()
        .filter_map(|key| payload.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Field-level messages from an `errors` object, passed through verbatim.
///
/// List values (one message per rule) are joined with a space.
fn field_errors(payload: &Value) -> BTreeMap<String, String> {
    let Some(errors) = payload.get("errors").and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    errors
        .iter()
        .map(|(field, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
                other => other.to_string(),
            };
            (field.clone(), text)
        })
        .collect()
}

/// Failure of a user-facing flow, ready to render inline on a form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FlowError {
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

impl FlowError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Translate an API failure, using `fallback` when the server said nothing.
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        let message = match err {
            ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
            other => other.server_message().unwrap_or(fallback).to_string(),
        };
        let field_errors = match err {
            ApiError::Rejected { field_errors, .. } => field_errors.clone(),
            _ => BTreeMap::new(),
        };
        Self {
            message,
            field_errors,
        }
    }

    /// Field errors, or `{general: message}` when the server sent none.
    pub fn form_errors(&self) -> BTreeMap<String, String> {
        if self.field_errors.is_empty() {
            BTreeMap::from([("general".to_string(), self.message.clone())])
        } else {
            self.field_errors.clone()
        }
    }
}

impl From<DomainError> for FlowError {
    fn from(err: DomainError) -> Self {
        FlowError::new(err.message())
    }
}
