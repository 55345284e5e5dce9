use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::hyperliquid::types::{ClearinghouseState, MarginSummary, RawPosition};
use crate::models::{AccountSummary, Position, Side};

use super::{DefaultedField, IngestReport, SkipReason, SkippedRecord};

/// Result of normalizing one clearinghouse snapshot.
#[derive(Debug)]
pub struct IngestOutcome {
    pub positions: Vec<Position>,
    pub report: IngestReport,
}

/// Normalize raw clearinghouse records into typed positions.
///
/// A record that cannot be minimally identified (no coin, zero net size) is
/// skipped and reported; any other malformed numeric field parses to zero and
/// the field name lands in the report. The batch itself never fails.
pub fn ingest_clearinghouse(state: &ClearinghouseState) -> IngestOutcome {
    let timestamp = server_time(state.time);
    let mut positions = Vec::with_capacity(state.asset_positions.len());
    let mut report = IngestReport::default();

    for asset_position in &state.asset_positions {
        let Some(raw) = asset_position.position.as_ref() else {
            report.skipped.push(SkippedRecord {
                coin: None,
                reason: SkipReason::EmptyRecord,
            });
            continue;
        };

        if let Some(position) = normalize_position(raw, timestamp, &mut report) {
            positions.push(position);
        }
    }

    report.parsed = positions.len();
    IngestOutcome { positions, report }
}

fn normalize_position(
    raw: &RawPosition,
    timestamp: DateTime<Utc>,
    report: &mut IngestReport,
) -> Option<Position> {
    let coin = match raw.coin.as_deref() {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => {
            report.skipped.push(SkippedRecord {
                coin: None,
                reason: SkipReason::MissingCoin,
            });
            return None;
        }
    };

    // szi carries the sign; a zero net size means no position is held.
    let szi = safe_decimal(raw.szi.as_deref(), &coin, "szi", report);
    if szi.is_zero() {
        report.skipped.push(SkippedRecord {
            coin: Some(coin),
            reason: SkipReason::ZeroSize,
        });
        return None;
    }

    let leverage = raw
        .leverage
        .as_ref()
        .and_then(|l| l.value.as_ref())
        .map(|v| safe_decimal_value(v, &coin, "leverage", report))
        .unwrap_or_else(|| {
            report.defaulted.push(DefaultedField {
                coin: coin.clone(),
                field: "leverage",
            });
            Decimal::ZERO
        });

    Some(Position {
        side: Side::from_signed_size(szi),
        size: szi.abs(),
        leverage,
        entry_price: safe_decimal(raw.entry_px.as_deref(), &coin, "entryPx", report),
        liquidation_price: safe_decimal(
            raw.liquidation_px.as_deref(),
            &coin,
            "liquidationPx",
            report,
        ),
        unrealized_pnl: safe_decimal(raw.unrealized_pnl.as_deref(), &coin, "unrealizedPnl", report),
        realized_pnl: safe_decimal(raw.realized_pnl.as_deref(), &coin, "realizedPnl", report),
        margin_used: safe_decimal(raw.margin_used.as_deref(), &coin, "marginUsed", report),
        timestamp,
        coin,
    })
}

/// Derive the account summary from the same clearinghouse snapshot.
pub fn summarize_account(state: &ClearinghouseState) -> AccountSummary {
    let mut report = IngestReport::default();
    let summary: &MarginSummary = &state.margin_summary;

    let total_unrealized_pnl = state
        .asset_positions
        .iter()
        .filter_map(|ap| ap.position.as_ref())
        .map(|p| {
            safe_decimal(
                p.unrealized_pnl.as_deref(),
                p.coin.as_deref().unwrap_or(""),
                "unrealizedPnl",
                &mut report,
            )
        })
        .sum::<Decimal>();

    let total_ntl_pos = safe_decimal(summary.total_ntl_pos.as_deref(), "", "totalNtlPos", &mut report);
    let total_margin_used = safe_decimal(
        summary.total_margin_used.as_deref(),
        "",
        "totalMarginUsed",
        &mut report,
    );

    let account_leverage = if total_margin_used > Decimal::ZERO {
        total_ntl_pos / total_margin_used
    } else {
        Decimal::ZERO
    };

    AccountSummary {
        account_value: safe_decimal(summary.account_value.as_deref(), "", "accountValue", &mut report),
        total_position_value: total_ntl_pos,
        total_margin_used,
        total_raw_usd: safe_decimal(summary.total_raw_usd.as_deref(), "", "totalRawUsd", &mut report),
        withdrawable: safe_decimal(state.withdrawable.as_deref(), "", "withdrawable", &mut report),
        total_unrealized_pnl,
        account_leverage,
        position_count: state.asset_positions.len() as i64,
    }
}

fn server_time(ms: Option<i64>) -> DateTime<Utc> {
    ms.and_then(|t| Utc.timestamp_millis_opt(t).single())
        .unwrap_or_else(Utc::now)
}

/// Safe conversion: parse or default to zero, recording the defaulted field.
pub(super) fn safe_decimal(
    raw: Option<&str>,
    coin: &str,
    field: &'static str,
    report: &mut IngestReport,
) -> Decimal {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => match Decimal::from_str(s) {
            Ok(d) => d,
            Err(_) => {
                report.defaulted.push(DefaultedField {
                    coin: coin.to_string(),
                    field,
                });
                Decimal::ZERO
            }
        },
        None => {
            report.defaulted.push(DefaultedField {
                coin: coin.to_string(),
                field,
            });
            Decimal::ZERO
        }
    }
}

/// Safe conversion for fields observed both as JSON numbers and strings.
fn safe_decimal_value(
    value: &serde_json::Value,
    coin: &str,
    field: &'static str,
    report: &mut IngestReport,
) -> Decimal {
    let parsed = match value {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        report.defaulted.push(DefaultedField {
            coin: coin.to_string(),
            field,
        });
        Decimal::ZERO
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
