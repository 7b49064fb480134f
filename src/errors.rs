// src/errors.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::StoreError;

/// Main error type for the dispatch service.
#[derive(Debug)]
pub enum DispatchError {
    // HTTP and API errors
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InternalServer(String),

    // Validation errors
    ValidationFailed(Vec<ValidationError>),
    InvalidTransition {
        current: String,
        requested: String,
        allowed: Vec<String>,
    },

    // Business logic errors
    TripNotFound(String),
    DriverNotFound(String),
    DriverNotVerified,
    DriverSuspended,
    VehicleOffline,
    ActiveTripExists(String),
    TripAlreadyAssigned,
    TripNotOfferable(String),
    CashPaymentBlocked(String),

    // Backing store errors
    StoreTimeout,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            DispatchError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            DispatchError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            DispatchError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DispatchError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DispatchError::InternalServer(msg) => write!(f, "Internal server error: {}", msg),

            DispatchError::ValidationFailed(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            DispatchError::InvalidTransition { current, requested, allowed } => write!(
                f,
                "Cannot transition from '{}' to '{}'; allowed: [{}]",
                current,
                requested,
                allowed.join(", ")
            ),

            DispatchError::TripNotFound(id) => write!(f, "Trip not found: {}", id),
            DispatchError::DriverNotFound(id) => write!(f, "Driver not found: {}", id),
            DispatchError::DriverNotVerified => write!(f, "Driver is not verified"),
            DispatchError::DriverSuspended => write!(f, "Driver account is suspended"),
            DispatchError::VehicleOffline => write!(f, "Driver has no online vehicle"),
            DispatchError::ActiveTripExists(id) => {
                write!(f, "Driver already has an active trip: {}", id)
            }
            DispatchError::TripAlreadyAssigned => {
                write!(f, "Trip is already assigned to another driver")
            }
            DispatchError::TripNotOfferable(status) => {
                write!(f, "Trip is no longer offerable (status: {})", status)
            }
            DispatchError::CashPaymentBlocked(reason) => {
                write!(f, "Cash payment blocked: {}", reason)
            }

            DispatchError::StoreTimeout => write!(f, "Store operation timed out"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            DispatchError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            DispatchError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg, None)
            }
            DispatchError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            DispatchError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            DispatchError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),

            DispatchError::ValidationFailed(errors) => {
                let details = serde_json::to_value(&errors).ok();
                (
                    StatusCode::BAD_REQUEST,
                    "validation_failed",
                    "Validation errors occurred".to_string(),
                    details,
                )
            }
            DispatchError::InvalidTransition { ref current, ref requested, ref allowed } => {
                let details = Some(serde_json::json!({
                    "current": current,
                    "requested": requested,
                    "allowed": allowed,
                }));
                let message = self.to_string();
                (StatusCode::BAD_REQUEST, "invalid_transition", message, details)
            }

            DispatchError::TripNotFound(id) => (
                StatusCode::NOT_FOUND,
                "trip_not_found",
                format!("Trip not found: {}", id),
                None,
            ),
            DispatchError::DriverNotFound(id) => (
                StatusCode::NOT_FOUND,
                "driver_not_found",
                format!("Driver not found: {}", id),
                None,
            ),
            DispatchError::DriverNotVerified => (
                StatusCode::FORBIDDEN,
                "driver_not_verified",
                "Driver is not verified".to_string(),
                None,
            ),
            DispatchError::DriverSuspended => (
                StatusCode::FORBIDDEN,
                "driver_suspended",
                "Driver account is suspended".to_string(),
                None,
            ),
            DispatchError::VehicleOffline => (
                StatusCode::FORBIDDEN,
                "vehicle_offline",
                "Driver has no online vehicle".to_string(),
                None,
            ),
            DispatchError::ActiveTripExists(id) => (
                StatusCode::CONFLICT,
                "active_trip_exists",
                format!("Driver already has an active trip: {}", id),
                None,
            ),
            DispatchError::TripAlreadyAssigned => (
                StatusCode::CONFLICT,
                "trip_already_assigned",
                "Trip is already assigned to another driver".to_string(),
                None,
            ),
            DispatchError::TripNotOfferable(status) => (
                StatusCode::BAD_REQUEST,
                "trip_not_offerable",
                format!("Trip is no longer offerable (status: {})", status),
                None,
            ),
            DispatchError::CashPaymentBlocked(reason) => (
                StatusCode::FORBIDDEN,
                "cash_payment_blocked",
                format!("Cash payment blocked: {}", reason),
                None,
            ),

            // All other errors are treated as internal server errors
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", self.to_string(), None),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, axum::Json(error_response)).into_response()
    }
}

// Convenience type alias for Results
pub type DispatchResult<T> = Result<T, DispatchError>;

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => DispatchError::StoreTimeout,
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::InternalServer(format!("JSON error: {}", err))
    }
}

// Helper functions for creating common errors
impl DispatchError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        DispatchError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        DispatchError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        DispatchError::Forbidden(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        DispatchError::NotFound(resource.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        DispatchError::InternalServer(msg.into())
    }

    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::ValidationFailed(vec![ValidationError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn trip_not_found(trip_id: impl Into<String>) -> Self {
        DispatchError::TripNotFound(trip_id.into())
    }

    pub fn driver_not_found(driver_id: impl Into<String>) -> Self {
        DispatchError::DriverNotFound(driver_id.into())
    }
}
