use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account-level summary derived from one clearinghouse snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_value: Decimal,
    /// Total notional position value (totalNtlPos).
    pub total_position_value: Decimal,
    pub total_margin_used: Decimal,
    pub total_raw_usd: Decimal,
    pub withdrawable: Decimal,
    pub total_unrealized_pnl: Decimal,
    /// totalNtlPos / totalMarginUsed, 0 when no margin is in use.
    pub account_leverage: Decimal,
    pub position_count: i64,
}

/// Database row for the append-only account_history table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub account_value: Decimal,
    pub total_position_value: Decimal,
    pub total_margin_used: Decimal,
    pub total_raw_usd: Decimal,
    pub withdrawable: Decimal,
    pub total_unrealized_pnl: Decimal,
    pub account_leverage: Decimal,
    pub position_count: i64,
    pub recorded_at: DateTime<Utc>,
}
