use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market metadata and current context for one perp, combined from the
/// universe listing and its asset context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInfo {
    pub symbol: String,
    pub size_decimals: u32,
    pub max_leverage: u32,
    pub mark_price: Decimal,
    pub oracle_price: Decimal,
    pub funding: Decimal,
    pub premium: Decimal,
    pub open_interest: Decimal,
    pub day_volume: Decimal,
}
