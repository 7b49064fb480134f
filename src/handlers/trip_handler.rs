// src/handlers/trip_handler.rs
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::auth::DriverContext;
use crate::errors::DispatchResult;
use crate::models::trip::{
    ActiveTripResponse, DriverTripEarningsView, StatusUpdateRequest, StatusUpdateResponse,
};
use crate::services::earnings_service::EarningsOperations;
use crate::services::trip_service::TripOperations;
use crate::state::AppState;

pub async fn active_trip(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
) -> DispatchResult<Json<ActiveTripResponse>> {
    let response = state.trip_service.active_trip(&ctx.driver_id).await?;
    Ok(Json(response))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
    Path(trip_id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> DispatchResult<Json<StatusUpdateResponse>> {
    let response = state
        .trip_service
        .transition(&ctx.driver_id, &trip_id, body)
        .await?;
    Ok(Json(response))
}

pub async fn trip_earnings(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
    Path(trip_id): Path<String>,
) -> DispatchResult<Json<DriverTripEarningsView>> {
    let view = state
        .earnings_service
        .trip_earnings(&ctx.driver_id, &trip_id)
        .await?;
    Ok(Json(view))
}
