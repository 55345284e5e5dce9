use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{AccountRow, AccountSummary};

/// Append one account summary row.
pub async fn insert_account_summary(
    pool: &PgPool,
    summary: &AccountSummary,
    recorded_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO account_history
            (account_value, total_position_value, total_margin_used, total_raw_usd,
             withdrawable, total_unrealized_pnl, account_leverage, position_count,
             recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(summary.account_value)
    .bind(summary.total_position_value)
    .bind(summary.total_margin_used)
    .bind(summary.total_raw_usd)
    .bind(summary.withdrawable)
    .bind(summary.total_unrealized_pnl)
    .bind(summary.account_leverage)
    .bind(summary.position_count)
    .bind(recorded_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// The most recent account summary, if any has been recorded.
pub async fn get_latest_account(pool: &PgPool) -> anyhow::Result<Option<AccountRow>> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT * FROM account_history ORDER BY recorded_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
