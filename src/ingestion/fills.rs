use chrono::{TimeZone, Utc};

use crate::hyperliquid::types::RawFill;
use crate::models::Fill;

use super::{snapshot::safe_decimal, IngestReport, SkipReason, SkippedRecord};

/// Result of normalizing a batch of raw fills.
#[derive(Debug)]
pub struct FillIngestOutcome {
    pub fills: Vec<Fill>,
    pub report: IngestReport,
}

/// Normalize raw fill events. A fill without a trade id cannot be ingested
/// idempotently and is skipped; a fill without a coin is unusable. Everything
/// else parses with per-field zero defaults, reported to the caller.
pub fn ingest_fills(raw_fills: &[RawFill]) -> FillIngestOutcome {
    let mut fills = Vec::with_capacity(raw_fills.len());
    let mut report = IngestReport::default();

    for raw in raw_fills {
        let coin = match raw.coin.as_deref() {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                report.skipped.push(SkippedRecord {
                    coin: None,
                    reason: SkipReason::MissingCoin,
                });
                continue;
            }
        };

        let Some(tid) = raw.tid else {
            report.skipped.push(SkippedRecord {
                coin: Some(coin),
                reason: SkipReason::MissingFillId,
            });
            continue;
        };

        let filled_at = raw
            .time
            .and_then(|t| Utc.timestamp_millis_opt(t).single())
            .unwrap_or_else(Utc::now);

        fills.push(Fill {
            fill_id: tid.to_string(),
            order_id: raw.oid.map(|o| o.to_string()).unwrap_or_default(),
            side: side_label(raw.side.as_deref()).to_string(),
            size: safe_decimal(raw.sz.as_deref(), &coin, "sz", &mut report),
            price: safe_decimal(raw.px.as_deref(), &coin, "px", &mut report),
            closed_pnl: safe_decimal(raw.closed_pnl.as_deref(), &coin, "closedPnl", &mut report),
            filled_at,
            coin,
        });
    }

    report.parsed = fills.len();
    FillIngestOutcome { fills, report }
}

/// Hyperliquid encodes fill sides as "B" (bid/buy) and "A" (ask/sell).
fn side_label(raw: Option<&str>) -> &'static str {
    match raw {
        Some("B") | Some("b") => "buy",
        Some("A") | Some("a") => "sell",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn fills_from_json(json: serde_json::Value) -> Vec<RawFill> {
        serde_json::from_value(json).expect("wire type should tolerate any shape")
    }

    #[test]
    fn test_ingest_fills_basic() {
        let raw = fills_from_json(serde_json::json!([
            {"coin": "BTC", "px": "40100", "sz": "0.1", "side": "A",
             "time": 1700000000000i64, "closedPnl": "10.5", "oid": 77, "tid": 1001},
            {"coin": "ETH", "px": "2500", "sz": "1", "side": "B",
             "time": 1700000060000i64, "closedPnl": "0", "oid": 78, "tid": 1002}
        ]));

        let outcome = ingest_fills(&raw);
        assert_eq!(outcome.fills.len(), 2);
        assert!(outcome.report.is_clean());

        let btc = &outcome.fills[0];
        assert_eq!(btc.fill_id, "1001");
        assert_eq!(btc.order_id, "77");
        assert_eq!(btc.side, "sell");
        assert_eq!(btc.closed_pnl, Decimal::new(105, 1));
    }

    #[test]
    fn test_fill_without_tid_is_skipped() {
        let raw = fills_from_json(serde_json::json!([
            {"coin": "BTC", "px": "40100", "sz": "0.1", "side": "A", "closedPnl": "10"},
            {"px": "1", "sz": "1", "side": "B", "tid": 5}
        ]));

        let outcome = ingest_fills(&raw);
        assert!(outcome.fills.is_empty());
        assert_eq!(outcome.report.skipped.len(), 2);
        assert_eq!(outcome.report.skipped[0].reason, SkipReason::MissingFillId);
        assert_eq!(outcome.report.skipped[1].reason, SkipReason::MissingCoin);
    }
}
