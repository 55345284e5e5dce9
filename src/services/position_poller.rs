use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::{account_repo, metrics_repo, position_repo};
use crate::hyperliquid::InfoClient;
use crate::ingestion::{ingest_clearinghouse, summarize_account, IngestReport};
use crate::models::RiskLimits;
use crate::risk::score_portfolio;

/// Serializes persistence writes to at most one batch per configured
/// interval. Owned exclusively by the poller task, so no locking is needed.
pub struct WriteGate {
    min_interval: Duration,
    last_write: Option<Instant>,
}

impl WriteGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_write: None,
        }
    }

    /// Returns true and arms the gate if enough time has passed since the
    /// last acquired write.
    pub fn try_acquire(&mut self) -> bool {
        match self.last_write {
            Some(at) if at.elapsed() < self.min_interval => false,
            _ => {
                self.last_write = Some(Instant::now());
                true
            }
        }
    }
}

/// Run the position poller loop: fetch the clearinghouse snapshot, normalize
/// it, score the portfolio, and append position/metrics/account rows behind
/// the write gate. Every fallible step logs and continues to the next cycle;
/// a write failure marks the cycle failed but never terminates the process.
pub async fn run_position_poller(
    pool: PgPool,
    client: Arc<InfoClient>,
    wallet: String,
    limits: RiskLimits,
    interval_secs: u64,
    min_write_interval_secs: u64,
) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    let mut gate = WriteGate::new(Duration::from_secs(min_write_interval_secs));
    tracing::info!(interval_secs, "Position poller started");

    loop {
        ticker.tick().await;
        let started = Instant::now();

        let state = match client.clearinghouse_state(&wallet).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Position poller: failed to fetch clearinghouse state");
                counter!("poll_cycles_failed").increment(1);
                continue;
            }
        };

        let outcome = ingest_clearinghouse(&state);
        log_report(&outcome.report);
        counter!("snapshot_records_skipped").increment(outcome.report.skipped.len() as u64);

        let summary = summarize_account(&state);
        gauge!("open_positions").set(outcome.positions.len() as f64);
        gauge!("account_value").set(decimal_to_f64(summary.account_value));

        let portfolio = score_portfolio(&outcome.positions, summary.account_value, &limits);

        match &portfolio {
            Some(risk) => {
                for warning in &risk.warnings {
                    tracing::warn!("{warning}");
                }
            }
            None => {
                tracing::debug!("Position poller: no open positions");
            }
        }

        if !gate.try_acquire() {
            tracing::debug!("Position poller: write gate closed — skipping persistence");
            continue;
        }

        let recorded_at = Utc::now();
        let mut cycle_failed = false;

        for position in &outcome.positions {
            if let Err(e) = position_repo::insert_snapshot(&pool, position).await {
                tracing::error!(error = %e, coin = %position.coin, "Failed to append position snapshot");
                cycle_failed = true;
            }
        }

        if let Some(risk) = &portfolio {
            if let Err(e) = metrics_repo::insert_metrics(&pool, risk, &summary, recorded_at).await {
                tracing::error!(error = %e, "Failed to append metrics row");
                cycle_failed = true;
            }
        }

        if let Err(e) = account_repo::insert_account_summary(&pool, &summary, recorded_at).await {
            tracing::error!(error = %e, "Failed to append account summary");
            cycle_failed = true;
        }

        histogram!("poll_cycle_seconds").record(started.elapsed().as_secs_f64());

        if cycle_failed {
            counter!("poll_cycles_failed").increment(1);
        } else {
            counter!("poll_cycles_total").increment(1);
            tracing::info!(
                positions = outcome.positions.len(),
                account_value = %summary.account_value,
                "Poll cycle persisted"
            );
        }
    }
}

fn log_report(report: &IngestReport) {
    for skipped in &report.skipped {
        tracing::warn!(
            coin = skipped.coin.as_deref().unwrap_or("<unknown>"),
            reason = %skipped.reason,
            "Snapshot record skipped"
        );
    }

    if !report.defaulted.is_empty() {
        tracing::warn!(
            count = report.defaulted.len(),
            fields = ?report
                .defaulted
                .iter()
                .map(|d| format!("{}:{}", d.coin, d.field))
                .collect::<Vec<_>>(),
            "Snapshot fields defaulted to zero"
        );
    }
}

fn decimal_to_f64(d: rust_decimal::Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    d.to_f64().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
