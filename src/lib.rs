pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod history;
pub mod hyperliquid;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod risk;
pub mod services;

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;
use crate::hyperliquid::InfoClient;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub client: Arc<InfoClient>,
    pub metrics_handle: PrometheusHandle,
}
