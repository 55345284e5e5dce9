pub mod account;
pub mod fill;
pub mod market;
pub mod position;
pub mod risk;

pub use account::{AccountRow, AccountSummary};
pub use fill::Fill;
pub use market::MarketInfo;
pub use position::{Position, PositionRow};
pub use risk::{MetricsRow, PortfolioRisk, PositionRisk, RiskLimits};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Side is encoded by the sign of the raw signed size (`szi`).
    pub fn from_signed_size(szi: Decimal) -> Self {
        if szi < Decimal::ZERO {
            Side::Short
        } else {
            Side::Long
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
