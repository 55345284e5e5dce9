use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::ingestion::ingest_market_info;
use crate::models::MarketInfo;
use crate::AppState;

/// Market metadata and current context for every listed perp. Served through
/// the cached exchange client, so repeated dashboard refreshes within the
/// cache TTL cost one upstream request.
pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<MarketInfo>>> {
    match state.client.meta_and_asset_ctxs().await {
        Ok((meta, ctxs)) => Json(ApiResponse::ok(ingest_market_info(&meta, &ctxs))),
        Err(e) => Json(ApiResponse::err(e)),
    }
}
