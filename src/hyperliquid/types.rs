//! Raw wire types for the Hyperliquid `/info` endpoint.
//!
//! Numeric fields arrive as JSON strings; everything is optional here and the
//! ingestion layer is responsible for safe conversion. Nothing in this module
//! should reject a response over one malformed field.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// clearinghouseState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearinghouseState {
    #[serde(default)]
    pub asset_positions: Vec<AssetPosition>,
    #[serde(default)]
    pub margin_summary: MarginSummary,
    #[serde(default)]
    pub cross_margin_summary: Option<MarginSummary>,
    #[serde(default)]
    pub withdrawable: Option<String>,
    /// Server time in epoch milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPosition {
    #[serde(default)]
    pub position: Option<RawPosition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosition {
    #[serde(default)]
    pub coin: Option<String>,
    /// Signed size; sign encodes the side.
    #[serde(default)]
    pub szi: Option<String>,
    #[serde(default)]
    pub leverage: Option<RawLeverage>,
    #[serde(default)]
    pub entry_px: Option<String>,
    #[serde(default)]
    pub liquidation_px: Option<String>,
    #[serde(default)]
    pub margin_used: Option<String>,
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
    #[serde(default)]
    pub realized_pnl: Option<String>,
    #[serde(default)]
    pub position_value: Option<String>,
    #[serde(default)]
    pub return_on_equity: Option<String>,
}

/// Leverage arrives as `{"type": "cross", "value": 20}`; `value` has been
/// observed both as a number and a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLeverage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginSummary {
    #[serde(default)]
    pub account_value: Option<String>,
    #[serde(default)]
    pub total_ntl_pos: Option<String>,
    #[serde(default)]
    pub total_raw_usd: Option<String>,
    #[serde(default)]
    pub total_margin_used: Option<String>,
}

// ---------------------------------------------------------------------------
// metaAndAssetCtxs: response is a two-element array [meta, contexts]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub universe: Vec<UniverseEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sz_decimals: Option<u32>,
    #[serde(default)]
    pub max_leverage: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCtx {
    #[serde(default)]
    pub funding: Option<String>,
    #[serde(default)]
    pub mark_px: Option<String>,
    #[serde(default)]
    pub oracle_px: Option<String>,
    #[serde(default)]
    pub premium: Option<String>,
    #[serde(default)]
    pub open_interest: Option<String>,
    #[serde(default)]
    pub day_ntl_vlm: Option<String>,
}

// ---------------------------------------------------------------------------
// userFills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFill {
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub px: Option<String>,
    #[serde(default)]
    pub sz: Option<String>,
    /// "B" (buy) or "A" (sell).
    #[serde(default)]
    pub side: Option<String>,
    /// Fill time in epoch milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub closed_pnl: Option<String>,
    /// Order id.
    #[serde(default)]
    pub oid: Option<i64>,
    /// Trade id; globally unique, the idempotence key.
    #[serde(default)]
    pub tid: Option<i64>,
    #[serde(default)]
    pub hash: Option<String>,
}
