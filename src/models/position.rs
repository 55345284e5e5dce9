use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Side;

/// A normalized position snapshot, one instance per polling cycle per held
/// coin. Size is stored as an absolute magnitude; `side` carries the sign.
/// Instances are superseded by the next snapshot, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub coin: String,
    pub side: Side,
    pub size: Decimal,
    pub leverage: Decimal,
    pub entry_price: Decimal,
    pub liquidation_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub margin_used: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Notional value at entry (size × entry price).
    pub fn value(&self) -> Decimal {
        self.size * self.entry_price
    }

    /// Notional exposure (value × leverage).
    pub fn exposure(&self) -> Decimal {
        self.value() * self.leverage
    }
}

/// Database row for the append-only position_history table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PositionRow {
    pub id: Uuid,
    pub coin: String,
    pub side: String,
    pub size: Decimal,
    pub leverage: Decimal,
    pub entry_price: Decimal,
    pub liquidation_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub margin_used: Decimal,
    pub snapshot_at: DateTime<Utc>,
}
