use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::ApiResponse;
use crate::db::position_repo;
use crate::errors::AppError;
use crate::models::PositionRow;
use crate::AppState;

#[derive(Deserialize)]
pub struct WindowQuery {
    /// Window size in hours, relative to now (UTC). Defaults to 24.
    pub hours: Option<i64>,
}

impl WindowQuery {
    pub fn window_hours(&self) -> Result<i64, AppError> {
        let hours = self.hours.unwrap_or(24);
        if hours <= 0 {
            return Err(AppError::BadRequest(format!(
                "hours must be positive, got {hours}"
            )));
        }
        Ok(hours)
    }
}

/// Open positions: the rows of the newest snapshot batch.
pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<PositionRow>>> {
    match position_repo::get_open_positions(&state.db).await {
        Ok(rows) => Json(ApiResponse::ok(rows)),
        Err(e) => Json(ApiResponse::err(e)),
    }
}

/// Raw snapshot rows over the requested window.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<ApiResponse<Vec<PositionRow>>>, AppError> {
    let since = Utc::now() - Duration::hours(params.window_hours()?);
    let rows = position_repo::get_position_history(&state.db, since).await?;
    Ok(Json(ApiResponse::ok(rows)))
}
