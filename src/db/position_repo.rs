use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{Position, PositionRow};

/// Append one snapshot row. The table is append-only: rows are facts and are
/// never updated; the open/closed state is derived at read time.
pub async fn insert_snapshot(pool: &PgPool, position: &Position) -> anyhow::Result<PositionRow> {
    let row = sqlx::query_as::<_, PositionRow>(
        r#"
        INSERT INTO position_history
            (coin, side, size, leverage, entry_price, liquidation_price,
             unrealized_pnl, realized_pnl, margin_used, snapshot_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(&position.coin)
    .bind(position.side.as_str())
    .bind(position.size)
    .bind(position.leverage)
    .bind(position.entry_price)
    .bind(position.liquidation_price)
    .bind(position.unrealized_pnl)
    .bind(position.realized_pnl)
    .bind(position.margin_used)
    .bind(position.timestamp)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Snapshot rows at or after `since`, oldest first.
pub async fn get_position_history(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> anyhow::Result<Vec<PositionRow>> {
    let rows = sqlx::query_as::<_, PositionRow>(
        "SELECT * FROM position_history WHERE snapshot_at >= $1 ORDER BY snapshot_at, coin",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The derived open view: rows of the newest snapshot batch. A coin held a
/// poll ago but absent here is closed; no row is ever flipped to say so.
pub async fn get_open_positions(pool: &PgPool) -> anyhow::Result<Vec<PositionRow>> {
    let rows = sqlx::query_as::<_, PositionRow>(
        r#"
        SELECT * FROM position_history
        WHERE snapshot_at = (SELECT MAX(snapshot_at) FROM position_history)
        ORDER BY coin
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
