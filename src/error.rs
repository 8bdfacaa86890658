use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use crate::models::ReservationStatus;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Layout cannot be used as given; needs a corrected descriptor.
    #[error("invalid layout descriptor: {reason}")]
    InvalidDescriptor { reason: String, hint: String },

    /// A floor plan is configured but yields no seats.
    #[error("floor plan for event {event_id} compiled to zero seats")]
    EmptyLayout { event_id: i64 },

    /// Generation stopped at the safety cap. The partial result is still usable.
    #[error("seat generation stopped at safety cap of {cap} seats")]
    CapacityExceeded { cap: usize },

    #[error("seat {seat_id} is already reserved")]
    SeatUnavailable { seat_id: i64 },

    #[error("cannot move reservation from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("seat {0} not found")]
    SeatNotFound(i64),

    #[error("reservation {0} not found")]
    ReservationNotFound(Uuid),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Whether the caller can expect a plain retry (or a retry with another seat) to work.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::SeatUnavailable { .. } | EngineError::StorageFailure(_)
        )
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            EngineError::InvalidDescriptor { hint, .. } => Some(hint.clone()),
            EngineError::EmptyLayout { .. } => Some(
                "check row/column counts, seat counts and radii in the floor plan, then save it again"
                    .to_string(),
            ),
            EngineError::SeatUnavailable { .. } => Some("pick another seat".to_string()),
            EngineError::StorageFailure(_) => Some("retry the request".to_string()),
            _ => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidDescriptor { .. } => "INVALID_DESCRIPTOR",
            EngineError::EmptyLayout { .. } => "EMPTY_LAYOUT",
            EngineError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            EngineError::SeatUnavailable { .. } => "SEAT_UNAVAILABLE",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::SeatNotFound(_) => "SEAT_NOT_FOUND",
            EngineError::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            EngineError::InvalidDescriptor { .. } | EngineError::EmptyLayout { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::SeatUnavailable { .. } => status_419(),
            EngineError::InvalidTransition { .. } => StatusCode::CONFLICT,
            EngineError::SeatNotFound(_) | EngineError::ReservationNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            EngineError::CapacityExceeded { .. } => StatusCode::OK,
            EngineError::StorageFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

// 419 - место уже занято другим покупателем
pub(crate) fn status_419() -> StatusCode {
    StatusCode::from_u16(419).unwrap_or(StatusCode::CONFLICT)
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::StorageFailure(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for EngineError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        EngineError::StorageFailure(err.to_string())
    }
}

impl From<redis::RedisError> for EngineError {
    fn from(err: redis::RedisError) -> Self {
        EngineError::StorageFailure(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let EngineError::StorageFailure(msg) = &self {
            tracing::error!(error = %msg, "storage failure");
        }

        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
            "retryable": self.is_retryable(),
        });
        if let Some(hint) = self.hint() {
            body["hint"] = json!(hint);
        }

        (status, axum::Json(body)).into_response()
    }
}
