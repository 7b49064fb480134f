// src/auth.rs
//! Bearer-token authentication. The extractor resolves the session and the
//! driver profile once per request into a single typed context; handlers
//! never touch raw headers or loosely-typed request extensions.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DispatchError;
use crate::models::driver::DriverProfile;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Driver,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub driver_id: String,
    pub role: Role,
}

impl Session {
    pub fn issue(driver_id: &str, role: Role) -> Self {
        Session {
            token: Uuid::new_v4().to_string(),
            driver_id: driver_id.to_string(),
            role,
        }
    }
}

/// Everything a driver-facing handler needs to know about the caller.
#[derive(Debug, Clone)]
pub struct DriverContext {
    pub driver_id: String,
    pub role: Role,
    pub profile: DriverProfile,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for DriverContext {
    type Rejection = DispatchError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| DispatchError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| DispatchError::unauthorized("Expected a bearer token"))?;

        let session = state
            .store
            .get_session(token)
            .await?
            .ok_or_else(|| DispatchError::unauthorized("Invalid or expired token"))?;

        if session.role != Role::Driver {
            return Err(DispatchError::forbidden("Driver role required"));
        }

        let profile = state
            .store
            .get_driver(&session.driver_id)
            .await?
            .ok_or_else(|| DispatchError::forbidden("No driver profile for this session"))?;

        Ok(DriverContext {
            driver_id: session.driver_id,
            role: session.role,
            profile,
        })
    }
}
