use reqwest::StatusCode;
use serde::Deserialize;

use crate::billing::format_cents;

/// Error body shapes the backend is known to send.
///
/// The DCMS server nests `{ "error": { "code", "message" } }`; other
/// endpoints return a flat `{ "message" }`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub code: Option<String>,
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("connection error: {0}")]
    Network(String),
    #[error("the request took too long")]
    Timeout,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Backend {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("session error: {0}")]
    Session(String),
}

impl ApiError {
    pub fn not_logged_in() -> Self {
        ApiError::Unauthorized("Not logged in".into())
    }

    /// 401/403: the session is gone and the user has to log in again.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Forbidden(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    /// Normalize a non-2xx response into an error.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();

        let (code, message) = match parsed {
            Some(ErrorResponse {
                error: Some(obj), ..
            }) => (obj.code, obj.message),
            Some(flat) => (flat.code, flat.message),
            None => (None, None),
        };

        let message = message.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )
        });

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            _ => ApiError::Backend {
                status: status.as_u16(),
                code,
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Data-entry failures, raised before anything reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,
    #[error(
        "payment amount {} exceeds the pending balance {}",
        money(.amount),
        money(.pending)
    )]
    ExceedsPending { amount: i64, pending: i64 },
    #[error("quotation is void and cannot receive payments")]
    QuotationVoid,
    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("service duration must be greater than zero")]
    ZeroDuration,
    #[error("appointment starting at {start} would end past midnight")]
    CrossesMidnight { start: String },
    #[error("cannot {action} {subject}: it is {status}")]
    IllegalTransition {
        subject: &'static str,
        action: &'static str,
        status: &'static str,
    },
    #[error("slot {start}-{end} is already taken")]
    SlotTaken { start: String, end: String },
    #[error("{0} is not loaded")]
    NotLoaded(&'static str),
    #[error("{0}")]
    Required(&'static str),
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
}

fn money(cents: &i64) -> String {
    format_cents(*cents)
}
