use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected read API — requires Bearer token when one is configured
    let protected = Router::new()
        // Positions
        .route("/api/positions", get(handlers::positions::list))
        .route("/api/positions/history", get(handlers::positions::history))
        // Account
        .route("/api/account", get(handlers::account::summary))
        // Markets
        .route("/api/markets", get(handlers::markets::list))
        // Analytics
        .route("/api/metrics/history", get(handlers::analytics::metrics_history))
        .route("/api/analytics/realized-pnl", get(handlers::analytics::realized_pnl))
        .route("/api/analytics/pnl-series", get(handlers::analytics::pnl_series))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // CORS: the dashboard is served from another origin; the API is read-only.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
