use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::db::account_repo;
use crate::models::AccountRow;
use crate::AppState;

/// Latest recorded account summary, or an explicit "no data" error when
/// nothing has been recorded yet.
pub async fn summary(State(state): State<AppState>) -> Json<ApiResponse<AccountRow>> {
    match account_repo::get_latest_account(&state.db).await {
        Ok(Some(row)) => Json(ApiResponse::ok(row)),
        Ok(None) => Json(ApiResponse::err("no account data recorded yet")),
        Err(e) => Json(ApiResponse::err(e)),
    }
}
