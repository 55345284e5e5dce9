use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{AccountSummary, MetricsRow, PortfolioRisk};

/// Append one metrics row: the full portfolio risk snapshot plus the account
/// summary fields it was computed against.
pub async fn insert_metrics(
    pool: &PgPool,
    risk: &PortfolioRisk,
    summary: &AccountSummary,
    recorded_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO metrics_history
            (account_value, total_position_value, total_margin_used, free_margin,
             total_unrealized_pnl, account_leverage, total_exposure,
             exposure_equity_ratio, largest_position_pct, concentration_score,
             portfolio_heat, risk_adjusted_return, margin_utilization, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(summary.account_value)
    .bind(summary.total_position_value)
    .bind(summary.total_margin_used)
    .bind(summary.withdrawable)
    .bind(summary.total_unrealized_pnl)
    .bind(summary.account_leverage)
    .bind(risk.total_exposure_usd)
    .bind(risk.exposure_to_equity_ratio)
    .bind(risk.largest_position_pct)
    .bind(risk.concentration_score)
    .bind(risk.portfolio_heat)
    .bind(risk.risk_adjusted_return)
    .bind(risk.margin_utilization)
    .bind(recorded_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Metrics rows at or after `since`, oldest first.
pub async fn get_metrics_history(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> anyhow::Result<Vec<MetricsRow>> {
    let rows = sqlx::query_as::<_, MetricsRow>(
        "SELECT * FROM metrics_history WHERE recorded_at >= $1 ORDER BY recorded_at",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
