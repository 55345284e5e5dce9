use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Configurable risk limits. Always injected into the scorer, never
/// hard-coded there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Max single position notional in USD (default 100k).
    pub max_position_size_usd: Decimal,
    /// Max allowed leverage (default 50).
    pub max_leverage: Decimal,
    /// Max allowed drawdown percentage (default 15).
    pub max_drawdown_pct: Decimal,
    /// Max single position margin as % of account value (default 20).
    pub max_position_pct: Decimal,
    /// Min distance to liquidation in % (default 10).
    pub min_distance_to_liq: Decimal,
    /// Max correlation between positions (default 0.7).
    pub max_correlation: Decimal,
    /// Margin utilization % above which a portfolio warning is emitted.
    pub warn_margin_utilization: Decimal,
    /// Portfolio heat above which a warning is emitted.
    pub warn_portfolio_heat: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_size_usd: Decimal::from(100_000),
            max_leverage: Decimal::from(50),
            max_drawdown_pct: Decimal::from(15),
            max_position_pct: Decimal::from(20),
            min_distance_to_liq: Decimal::from(10),
            max_correlation: Decimal::new(7, 1), // 0.7
            warn_margin_utilization: Decimal::from(80),
            warn_portfolio_heat: Decimal::from(70),
        }
    }
}

/// Per-position risk metrics, derived transiently by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRisk {
    pub coin: String,
    pub position_value_usd: Decimal,
    pub exposure_usd: Decimal,
    /// Margin-based share of the account, in %.
    pub pct_of_account: Decimal,
    pub distance_to_liquidation: Decimal,
    pub leverage: Decimal,
    pub roi: Decimal,
    /// 0–100 under nominal limits; exceeds 100 when inputs exceed configured
    /// limits (intentional overflow signal, not clamped).
    pub risk_score: Decimal,
}

/// Portfolio-wide risk metrics, derived transiently by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRisk {
    pub total_exposure_usd: Decimal,
    pub exposure_to_equity_ratio: Decimal,
    pub largest_position_pct: Decimal,
    /// Herfindahl–Hirschman index over exposures, scaled to [100/N, 100].
    pub concentration_score: Decimal,
    pub portfolio_heat: Decimal,
    pub risk_adjusted_return: Decimal,
    pub margin_utilization: Decimal,
    pub warnings: Vec<String>,
}

/// Database row for the append-only metrics_history table: one row per
/// poll, carrying the full portfolio risk snapshot plus account fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MetricsRow {
    pub id: Uuid,
    pub account_value: Decimal,
    pub total_position_value: Decimal,
    pub total_margin_used: Decimal,
    pub free_margin: Decimal,
    pub total_unrealized_pnl: Decimal,
    pub account_leverage: Decimal,
    pub total_exposure: Decimal,
    pub exposure_equity_ratio: Decimal,
    pub largest_position_pct: Decimal,
    pub concentration_score: Decimal,
    pub portfolio_heat: Decimal,
    pub risk_adjusted_return: Decimal,
    pub margin_utilization: Decimal,
    pub recorded_at: DateTime<Utc>,
}
