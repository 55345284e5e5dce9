use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::Fill;

/// Idempotent upsert keyed by fill_id. Returns true if the fill was new;
/// re-submitting an already-recorded fill is a no-op, so the ingestion path
/// is safe under at-least-once redelivery.
pub async fn upsert_fill(pool: &PgPool, fill: &Fill) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO fills (fill_id, order_id, coin, side, size, price, closed_pnl, filled_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (fill_id) DO NOTHING
        "#,
    )
    .bind(&fill.fill_id)
    .bind(&fill.order_id)
    .bind(&fill.coin)
    .bind(&fill.side)
    .bind(fill.size)
    .bind(fill.price)
    .bind(fill.closed_pnl)
    .bind(fill.filled_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fills at or after `since`, oldest first.
pub async fn get_fills_since(pool: &PgPool, since: DateTime<Utc>) -> anyhow::Result<Vec<Fill>> {
    let fills = sqlx::query_as::<_, Fill>(
        "SELECT * FROM fills WHERE filled_at >= $1 ORDER BY filled_at, fill_id",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(fills)
}

/// Total realized PnL over the window: Σ closed_pnl for fills at or after
/// `since`, the same cumulative-sum rule the reconciler uses.
pub async fn get_total_realized_pnl(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> anyhow::Result<Decimal> {
    let row: (Option<Decimal>,) = sqlx::query_as(
        "SELECT COALESCE(SUM(closed_pnl), 0) FROM fills WHERE filled_at >= $1",
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(row.0.unwrap_or(Decimal::ZERO))
}
