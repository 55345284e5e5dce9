use crate::hyperliquid::types::{AssetCtx, Meta};
use crate::models::MarketInfo;

use super::{snapshot::safe_decimal, IngestReport};

/// Combine the universe listing with its asset contexts, index-aligned.
/// Entries without a name are dropped with a warning; numeric fields parse
/// with zero defaults like every other ingestion path.
pub fn ingest_market_info(meta: &Meta, ctxs: &[AssetCtx]) -> Vec<MarketInfo> {
    let mut markets = Vec::with_capacity(meta.universe.len());
    let mut report = IngestReport::default();

    for (idx, entry) in meta.universe.iter().enumerate() {
        let Some(ctx) = ctxs.get(idx) else {
            break;
        };

        let Some(symbol) = entry.name.as_deref().filter(|n| !n.is_empty()) else {
            tracing::warn!(index = idx, "Market entry without a name — dropping");
            continue;
        };

        markets.push(MarketInfo {
            symbol: symbol.to_string(),
            size_decimals: entry.sz_decimals.unwrap_or(0),
            max_leverage: entry.max_leverage.unwrap_or(0),
            mark_price: safe_decimal(ctx.mark_px.as_deref(), symbol, "markPx", &mut report),
            oracle_price: safe_decimal(ctx.oracle_px.as_deref(), symbol, "oraclePx", &mut report),
            funding: safe_decimal(ctx.funding.as_deref(), symbol, "funding", &mut report),
            premium: safe_decimal(ctx.premium.as_deref(), symbol, "premium", &mut report),
            open_interest: safe_decimal(ctx.open_interest.as_deref(), symbol, "openInterest", &mut report),
            day_volume: safe_decimal(ctx.day_ntl_vlm.as_deref(), symbol, "dayNtlVlm", &mut report),
        });
    }

    if !report.defaulted.is_empty() {
        tracing::debug!(
            defaulted = report.defaulted.len(),
            "Market info ingested with defaulted fields"
        );
    }

    markets
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_market_info_zips_universe_with_contexts() {
        let meta: Meta = serde_json::from_value(serde_json::json!({
            "universe": [
                {"name": "BTC", "szDecimals": 5, "maxLeverage": 50},
                {"name": "ETH", "szDecimals": 4, "maxLeverage": 50}
            ]
        }))
        .unwrap();
        let ctxs: Vec<AssetCtx> = serde_json::from_value(serde_json::json!([
            {"funding": "0.0000125", "markPx": "40000", "oraclePx": "40010",
             "premium": "0.0001", "openInterest": "1234.5", "dayNtlVlm": "9990000"},
            {"funding": "-0.00001", "markPx": "2500", "oraclePx": null,
             "openInterest": "888", "dayNtlVlm": "100000"}
        ]))
        .unwrap();

        let markets = ingest_market_info(&meta, &ctxs);
        assert_eq!(markets.len(), 2);
        assert_eq!(markets[0].symbol, "BTC");
        assert_eq!(markets[0].max_leverage, 50);
        assert_eq!(markets[0].mark_price, Decimal::from(40_000));
        // null oraclePx defaults to zero rather than failing the row
        assert_eq!(markets[1].oracle_price, Decimal::ZERO);
    }

    #[test]
    fn test_market_info_truncates_to_shorter_context_list() {
        let meta: Meta = serde_json::from_value(serde_json::json!({
            "universe": [{"name": "BTC"}, {"name": "ETH"}]
        }))
        .unwrap();
        let ctxs: Vec<AssetCtx> =
            serde_json::from_value(serde_json::json!([{"markPx": "40000"}])).unwrap();

        let markets = ingest_market_info(&meta, &ctxs);
        assert_eq!(markets.len(), 1);
    }
}
