use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::positions::WindowQuery;
use super::ApiResponse;
use crate::db::{fill_repo, metrics_repo, position_repo};
use crate::errors::AppError;
use crate::history::{reconcile, HistoryPoint, Window};
use crate::models::MetricsRow;
use crate::AppState;

/// Metrics rows over the requested window.
pub async fn metrics_history(
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<ApiResponse<Vec<MetricsRow>>>, AppError> {
    let since = Utc::now() - Duration::hours(params.window_hours()?);
    let rows = metrics_repo::get_metrics_history(&state.db, since).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// Total realized PnL over the window: Σ closed_pnl of all fills in it.
pub async fn realized_pnl(
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<ApiResponse<Decimal>>, AppError> {
    let since = Utc::now() - Duration::hours(params.window_hours()?);
    let total = fill_repo::get_total_realized_pnl(&state.db, since).await?;
    Ok(Json(ApiResponse::ok(total)))
}

#[derive(Deserialize)]
pub struct SeriesQuery {
    pub hours: Option<i64>,
    /// Grid resolution in seconds. Defaults to one minute.
    pub resolution_secs: Option<i64>,
}

/// The reconciled per-coin PnL series: snapshots and fills merged onto one
/// regular time grid.
pub async fn pnl_series(
    State(state): State<AppState>,
    Query(params): Query<SeriesQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryPoint>>>, AppError> {
    let hours = params.hours.unwrap_or(24);
    let resolution_secs = params.resolution_secs.unwrap_or(60);
    if hours <= 0 || resolution_secs <= 0 {
        return Err(AppError::BadRequest(
            "hours and resolution_secs must be positive".into(),
        ));
    }

    let window = Window::trailing(Duration::hours(hours));

    let snapshots = position_repo::get_position_history(&state.db, window.start).await?;
    let fills = fill_repo::get_fills_since(&state.db, window.start).await?;

    let series = reconcile(
        &snapshots,
        &fills,
        window,
        Duration::seconds(resolution_secs),
    );

    Ok(Json(ApiResponse::ok(series)))
}
