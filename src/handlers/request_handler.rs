// src/handlers/request_handler.rs
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::DriverContext;
use crate::errors::DispatchResult;
use crate::models::trip::{
    AcceptTripRequest, AcceptTripResponse, DeclineTripRequest, OfferDetailView,
    PendingTripRequestView,
};
use crate::services::acceptance_service::AcceptanceOperations;
use crate::services::offer_service::OfferOperations;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PendingRequestsResponse {
    pub requests: Vec<PendingTripRequestView>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub async fn pending_requests(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
) -> DispatchResult<Json<PendingRequestsResponse>> {
    let requests = state.offer_service.pending_offers(&ctx.driver_id).await?;
    Ok(Json(PendingRequestsResponse { requests }))
}

pub async fn request_detail(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
    Path(request_id): Path<String>,
) -> DispatchResult<Json<OfferDetailView>> {
    let detail = state
        .offer_service
        .offer_detail(&ctx.driver_id, &request_id)
        .await?;
    Ok(Json(detail))
}

pub async fn accept_request(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
    Path(request_id): Path<String>,
    Json(body): Json<AcceptTripRequest>,
) -> DispatchResult<Json<AcceptTripResponse>> {
    let response = state
        .acceptance_service
        .accept(&ctx.driver_id, &request_id, body)
        .await?;
    Ok(Json(response))
}

pub async fn decline_request(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
    Path(request_id): Path<String>,
    Json(body): Json<DeclineTripRequest>,
) -> DispatchResult<Json<SuccessResponse>> {
    state
        .acceptance_service
        .decline(&ctx.driver_id, &request_id, body)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}
