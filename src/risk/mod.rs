pub mod scorer;

pub use scorer::{score_portfolio, score_position, suggest_risk_adjustments};
