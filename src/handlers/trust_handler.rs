// src/handlers/trust_handler.rs
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::auth::DriverContext;
use crate::errors::DispatchResult;
use crate::models::driver::TrustScoreView;
use crate::services::trust_service::TrustOperations;
use crate::state::AppState;

pub async fn get_trust_score(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
) -> DispatchResult<Json<TrustScoreView>> {
    let view = state.trust_service.trust_score(&ctx.driver_id).await?;
    Ok(Json(view))
}

pub async fn recalculate_trust_score(
    State(state): State<Arc<AppState>>,
    ctx: DriverContext,
) -> DispatchResult<Json<TrustScoreView>> {
    let view = state.trust_service.recalculate(&ctx.driver_id).await?;
    Ok(Json(view))
}
