use std::sync::Arc;

use metrics::counter;
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::fill_repo;
use crate::hyperliquid::InfoClient;
use crate::ingestion::ingest_fills;

/// Run the fill poller loop: fetch the account's fills and upsert each by
/// fill_id. The upsert is idempotent, so redelivered fills and overlapping
/// fetch windows are harmless.
pub async fn run_fill_poller(
    pool: PgPool,
    client: Arc<InfoClient>,
    wallet: String,
    interval_secs: u64,
) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    tracing::info!(interval_secs, "Fill poller started");

    loop {
        ticker.tick().await;

        let raw_fills = match client.user_fills(&wallet).await {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(error = %e, "Fill poller: failed to fetch fills");
                continue;
            }
        };

        let outcome = ingest_fills(&raw_fills);
        for skipped in &outcome.report.skipped {
            tracing::warn!(
                coin = skipped.coin.as_deref().unwrap_or("<unknown>"),
                reason = %skipped.reason,
                "Fill skipped"
            );
        }

        let mut inserted = 0u64;
        let mut duplicates = 0u64;
        let mut failed = 0u64;

        for fill in &outcome.fills {
            match fill_repo::upsert_fill(&pool, fill).await {
                Ok(true) => inserted += 1,
                Ok(false) => duplicates += 1,
                Err(e) => {
                    tracing::error!(error = %e, fill_id = %fill.fill_id, "Failed to upsert fill");
                    failed += 1;
                }
            }
        }

        counter!("fills_ingested_total").increment(inserted);
        counter!("fills_duplicate_total").increment(duplicates);

        if inserted > 0 || failed > 0 {
            tracing::info!(inserted, duplicates, failed, "Fill poll cycle complete");
        } else {
            tracing::debug!(duplicates, "Fill poll cycle: nothing new");
        }
    }
}
