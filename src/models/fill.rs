use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single trade execution, immutable once recorded. `fill_id` is globally
/// unique and is the source of ingestion idempotence: re-submitting the same
/// fill is a no-op, never double-counted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fill {
    pub fill_id: String,
    pub order_id: String,
    pub coin: String,
    pub side: String,
    pub size: Decimal,
    pub price: Decimal,
    /// Realized PnL delta locked in by this execution.
    pub closed_pnl: Decimal,
    pub filled_at: DateTime<Utc>,
}
