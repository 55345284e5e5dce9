use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::models::{PortfolioRisk, Position, PositionRisk, RiskLimits};

/// Compute risk metrics for a single position against the injected limits.
///
/// The composite score is a weighted sum of four sub-scores, each the ratio
/// of the position's value to the corresponding limit scaled to 0–100. It is
/// deliberately not clamped above 100: inputs beyond the configured limits
/// push the score past 100 as an overflow signal.
pub fn score_position(
    position: &Position,
    account_value: Decimal,
    limits: &RiskLimits,
) -> PositionRisk {
    let position_value = position.value();
    let dist_to_liq = distance_to_liquidation(position);

    let pct_of_account = if account_value > Decimal::ZERO {
        position.margin_used / account_value * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let roi = if position.margin_used > Decimal::ZERO {
        position.unrealized_pnl / position.margin_used * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    PositionRisk {
        coin: position.coin.clone(),
        position_value_usd: position_value,
        exposure_usd: position.exposure(),
        pct_of_account,
        distance_to_liquidation: dist_to_liq,
        leverage: position.leverage,
        roi,
        risk_score: risk_score(position, dist_to_liq, limits),
    }
}

/// Percentage gap between entry price and liquidation price.
fn distance_to_liquidation(position: &Position) -> Decimal {
    if position.entry_price.is_zero() {
        return Decimal::ZERO;
    }
    (position.entry_price - position.liquidation_price).abs() / position.entry_price
        * Decimal::ONE_HUNDRED
}

/// Weighted composite: 0.3·leverage + 0.3·liquidation + 0.2·size + 0.2·pnl.
fn risk_score(position: &Position, dist_to_liq: Decimal, limits: &RiskLimits) -> Decimal {
    let leverage_score = position.leverage / limits.max_leverage * Decimal::ONE_HUNDRED;

    let liq_score = (Decimal::ONE - dist_to_liq / limits.min_distance_to_liq)
        .max(Decimal::ZERO)
        * Decimal::ONE_HUNDRED;

    let size_score = position.value() / limits.max_position_size_usd * Decimal::ONE_HUNDRED;

    let pnl_score = if position.margin_used > Decimal::ZERO {
        (-position.unrealized_pnl / position.margin_used * Decimal::ONE_HUNDRED)
            .max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    Decimal::new(3, 1) * leverage_score
        + Decimal::new(3, 1) * liq_score
        + Decimal::new(2, 1) * size_score
        + Decimal::new(2, 1) * pnl_score
}

/// Compute portfolio-wide risk metrics.
///
/// Returns `None` for an empty position list: the explicit "no positions"
/// sentinel, distinct from a portfolio whose metrics compute to zero.
pub fn score_portfolio(
    positions: &[Position],
    account_value: Decimal,
    limits: &RiskLimits,
) -> Option<PortfolioRisk> {
    if positions.is_empty() {
        return None;
    }

    let mut total_exposure = Decimal::ZERO;
    let mut largest_position = Decimal::ZERO;
    let mut total_margin_used = Decimal::ZERO;
    let mut exposures = Vec::with_capacity(positions.len());
    let mut warnings = Vec::new();

    for pos in positions {
        let exposure = pos.exposure();
        total_exposure += exposure;
        largest_position = largest_position.max(pos.value());
        total_margin_used += pos.margin_used;
        exposures.push(exposure);

        position_warnings(pos, account_value, limits, &mut warnings);
    }

    let exposure_to_equity_ratio = if account_value > Decimal::ZERO {
        total_exposure / account_value
    } else {
        Decimal::ZERO
    };

    let largest_position_pct = if account_value > Decimal::ZERO {
        largest_position / account_value * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let margin_utilization = if account_value > Decimal::ZERO {
        total_margin_used / account_value * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let portfolio_heat = heat(positions, limits);

    if margin_utilization > limits.warn_margin_utilization {
        warnings.push(format!(
            "WARNING: High margin utilization ({margin_utilization:.1}%)"
        ));
    }
    if portfolio_heat > limits.warn_portfolio_heat {
        warnings.push(format!("WARNING: High portfolio heat ({portfolio_heat:.1})"));
    }

    Some(PortfolioRisk {
        total_exposure_usd: total_exposure,
        exposure_to_equity_ratio,
        largest_position_pct,
        concentration_score: concentration(&exposures),
        portfolio_heat,
        risk_adjusted_return: risk_adjusted_return(positions),
        margin_utilization,
        warnings,
    })
}

fn position_warnings(
    pos: &Position,
    account_value: Decimal,
    limits: &RiskLimits,
    warnings: &mut Vec<String>,
) {
    let dist = distance_to_liquidation(pos);
    if dist < limits.min_distance_to_liq {
        warnings.push(format!(
            "WARNING: {} position close to liquidation ({dist:.1}%)",
            pos.coin
        ));
    }

    if account_value > Decimal::ZERO {
        let pct = pos.margin_used / account_value * Decimal::ONE_HUNDRED;
        if pct > limits.max_position_pct {
            warnings.push(format!(
                "WARNING: {} position size exceeds maximum ({pct:.1}%)",
                pos.coin
            ));
        }
    }

    if pos.leverage > limits.max_leverage {
        warnings.push(format!(
            "WARNING: {} leverage exceeds maximum ({}x)",
            pos.coin, pos.leverage
        ));
    }
}

/// Herfindahl–Hirschman index over exposure shares, scaled so a single
/// position scores 100 and N equal positions score 100/N.
fn concentration(exposures: &[Decimal]) -> Decimal {
    let total: Decimal = exposures.iter().copied().sum();
    if total.is_zero() {
        return Decimal::ZERO;
    }

    exposures
        .iter()
        .map(|e| {
            let share = e / total;
            share * share
        })
        .sum::<Decimal>()
        * Decimal::ONE_HUNDRED
}

/// Mean over positions of (leverage / max_leverage) × (1 / liquidation
/// distance fraction), scaled by 100. A distance of exactly zero substitutes
/// a factor of 1 to avoid the literal divide-by-zero; the quantity is
/// otherwise unbounded as distance approaches zero, which is the proximity
/// signal this metric exists to amplify.
fn heat(positions: &[Position], limits: &RiskLimits) -> Decimal {
    if positions.is_empty() {
        return Decimal::ZERO;
    }

    let total: Decimal = positions
        .iter()
        .map(|pos| {
            let dist_fraction = if pos.entry_price.is_zero() {
                Decimal::ZERO
            } else {
                (pos.entry_price - pos.liquidation_price).abs() / pos.entry_price
            };

            let proximity = if dist_fraction > Decimal::ZERO {
                Decimal::ONE / dist_fraction
            } else {
                Decimal::ONE
            };

            pos.leverage / limits.max_leverage * proximity
        })
        .sum();

    total / Decimal::from(positions.len() as i64) * Decimal::ONE_HUNDRED
}

/// Sharpe-like ratio over per-position returns (unrealized PnL / margin).
/// Population stddev; defaults to 1 below two positions, which intentionally
/// understates risk for single-position portfolios.
fn risk_adjusted_return(positions: &[Position]) -> Decimal {
    if positions.is_empty() {
        return Decimal::ZERO;
    }

    let returns: Vec<Decimal> = positions
        .iter()
        .map(|p| {
            if p.margin_used > Decimal::ZERO {
                p.unrealized_pnl / p.margin_used
            } else {
                Decimal::ZERO
            }
        })
        .collect();

    let n = Decimal::from(returns.len() as i64);
    let mean = returns.iter().copied().sum::<Decimal>() / n;

    let std_dev = if returns.len() < 2 {
        Decimal::ONE
    } else {
        let variance = returns
            .iter()
            .map(|r| {
                let diff = *r - mean;
                diff * diff
            })
            .sum::<Decimal>()
            / n;
        variance.sqrt().unwrap_or(Decimal::ONE)
    };

    if std_dev.is_zero() {
        return Decimal::ZERO;
    }

    mean / std_dev
}

/// Textual adjustment suggestions for positions breaching distance or size
/// limits.
pub fn suggest_risk_adjustments(
    positions: &[Position],
    account_value: Decimal,
    limits: &RiskLimits,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    for pos in positions {
        let risk = score_position(pos, account_value, limits);

        if risk.distance_to_liquidation < limits.min_distance_to_liq {
            suggestions.push(format!(
                "Consider reducing leverage or adding margin to {} position",
                pos.coin
            ));
        }

        if risk.pct_of_account > limits.max_position_pct {
            suggestions.push(format!("Consider reducing {} position size", pos.coin));
        }
    }

    suggestions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use chrono::Utc;

    fn make_position(
        coin: &str,
        size: Decimal,
        entry: Decimal,
        liq: Decimal,
        leverage: Decimal,
        margin: Decimal,
        upnl: Decimal,
    ) -> Position {
        Position {
            coin: coin.into(),
            side: Side::Long,
            size,
            leverage,
            entry_price: entry,
            liquidation_price: liq,
            unrealized_pnl: upnl,
            realized_pnl: Decimal::ZERO,
            margin_used: margin,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_risk_score_worked_example() {
        // leverage 10 of max 50 → leverage_score 20
        // distance 5% of min 10% → liq_score 50
        // value 20_000 of max 100_000 → size_score 20
        // margin 2_000, upnl -200 → pnl_score 10
        // 0.3·20 + 0.3·50 + 0.2·20 + 0.2·10 = 27
        let pos = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(20_000),
            Decimal::from(19_000),
            Decimal::from(10),
            Decimal::from(2_000),
            Decimal::from(-200),
        );

        let risk = score_position(&pos, Decimal::from(50_000), &RiskLimits::default());
        assert_eq!(risk.distance_to_liquidation, Decimal::from(5));
        assert_eq!(risk.risk_score, Decimal::from(27));
        assert_eq!(risk.pct_of_account, Decimal::from(4)); // 2000 / 50000
        assert_eq!(risk.roi, Decimal::from(-10));
    }

    #[test]
    fn test_risk_score_unbounded_above_limits() {
        // 100x leverage against a 50x limit, liquidation at the entry price:
        // every sub-score saturates or overflows, so the composite must
        // exceed 100 rather than clamp.
        let pos = make_position(
            "ETH",
            Decimal::from(100),
            Decimal::from(2_000),
            Decimal::from(2_000),
            Decimal::from(100),
            Decimal::from(1_000),
            Decimal::from(-2_000),
        );

        let risk = score_position(&pos, Decimal::from(10_000), &RiskLimits::default());
        // leverage_score 200, liq_score 100, size_score 200, pnl_score 200
        // → 0.3·200 + 0.3·100 + 0.2·200 + 0.2·200 = 170
        assert_eq!(risk.risk_score, Decimal::from(170));
    }

    #[test]
    fn test_roi_zero_when_no_margin() {
        let pos = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(90),
            Decimal::from(5),
            Decimal::ZERO,
            Decimal::from(50),
        );
        let risk = score_position(&pos, Decimal::from(1_000), &RiskLimits::default());
        assert_eq!(risk.roi, Decimal::ZERO);
    }

    #[test]
    fn test_concentration_single_position_is_100() {
        let pos = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(90),
            Decimal::from(3),
            Decimal::from(30),
            Decimal::ZERO,
        );
        let risk = score_portfolio(&[pos], Decimal::from(1_000), &RiskLimits::default())
            .expect("one position");
        assert_eq!(risk.concentration_score, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_concentration_two_equal_positions_is_50() {
        let a = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(90),
            Decimal::from(2),
            Decimal::from(50),
            Decimal::ZERO,
        );
        let b = make_position(
            "ETH",
            Decimal::from(2),
            Decimal::from(50),
            Decimal::from(45),
            Decimal::from(2),
            Decimal::from(50),
            Decimal::ZERO,
        );
        let risk = score_portfolio(&[a, b], Decimal::from(1_000), &RiskLimits::default())
            .expect("two positions");
        assert_eq!(risk.concentration_score, Decimal::from(50));
    }

    #[test]
    fn test_concentration_uneven_split() {
        // exposures 300 and 100 → shares 0.75 / 0.25 → HHI 62.5
        let a = make_position(
            "BTC",
            Decimal::from(3),
            Decimal::from(100),
            Decimal::from(90),
            Decimal::ONE,
            Decimal::from(100),
            Decimal::ZERO,
        );
        let b = make_position(
            "ETH",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(90),
            Decimal::ONE,
            Decimal::from(100),
            Decimal::ZERO,
        );
        let risk = score_portfolio(&[a, b], Decimal::from(1_000), &RiskLimits::default())
            .expect("two positions");
        assert_eq!(risk.concentration_score, Decimal::new(625, 1));
    }

    #[test]
    fn test_empty_portfolio_is_none_not_zeroes() {
        assert!(score_portfolio(&[], Decimal::from(1_000), &RiskLimits::default()).is_none());
    }

    #[test]
    fn test_margin_utilization_and_warning() {
        let a = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(50),
            Decimal::from(2),
            Decimal::from(850),
            Decimal::ZERO,
        );
        let risk = score_portfolio(&[a], Decimal::from(1_000), &RiskLimits::default())
            .expect("one position");
        assert_eq!(risk.margin_utilization, Decimal::from(85));
        assert!(risk
            .warnings
            .iter()
            .any(|w| w.contains("High margin utilization")));
    }

    #[test]
    fn test_position_warnings_emitted() {
        // 5% to liquidation (min 10), 30% of account margin (max 20),
        // 60x leverage (max 50): all three warnings fire.
        let pos = make_position(
            "DOGE",
            Decimal::from(1_000),
            Decimal::from(10),
            Decimal::new(95, 1),
            Decimal::from(60),
            Decimal::from(300),
            Decimal::ZERO,
        );
        let risk = score_portfolio(&[pos], Decimal::from(1_000), &RiskLimits::default())
            .expect("one position");

        assert!(risk.warnings.iter().any(|w| w.contains("close to liquidation")));
        assert!(risk.warnings.iter().any(|w| w.contains("exceeds maximum (30.0%)")));
        assert!(risk.warnings.iter().any(|w| w.contains("leverage exceeds maximum")));
    }

    #[test]
    fn test_portfolio_heat_zero_distance_guard() {
        // Liquidation at the entry price: the 1/distance factor substitutes 1
        // instead of dividing by zero.
        let pos = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(100),
            Decimal::from(25),
            Decimal::from(100),
            Decimal::ZERO,
        );
        let risk = score_portfolio(&[pos], Decimal::from(1_000), &RiskLimits::default())
            .expect("one position");
        // (25 / 50) * 1 * 100 = 50
        assert_eq!(risk.portfolio_heat, Decimal::from(50));
    }

    #[test]
    fn test_portfolio_heat_grows_near_liquidation() {
        // 1% to liquidation: heat = (10/50) * (1/0.01) * 100 = 2000, far
        // above any nominal scale.
        let pos = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(99),
            Decimal::from(10),
            Decimal::from(100),
            Decimal::ZERO,
        );
        let risk = score_portfolio(&[pos], Decimal::from(1_000), &RiskLimits::default())
            .expect("one position");
        assert_eq!(risk.portfolio_heat, Decimal::from(2_000));
    }

    #[test]
    fn test_risk_adjusted_return_single_position_uses_unit_stddev() {
        let pos = make_position(
            "BTC",
            Decimal::ONE,
            Decimal::from(100),
            Decimal::from(90),
            Decimal::from(5),
            Decimal::from(200),
            Decimal::from(100),
        );
        let risk = score_portfolio(&[pos], Decimal::from(1_000), &RiskLimits::default())
            .expect("one position");
        // return = 0.5, stddev defaults to 1
        assert_eq!(risk.risk_adjusted_return, Decimal::new(5, 1));
    }

    #[test]
    fn test_suggestions_for_breached_limits() {
        let pos = make_position(
            "SOL",
            Decimal::from(100),
            Decimal::from(20),
            Decimal::from(19),
            Decimal::from(10),
            Decimal::from(400),
            Decimal::ZERO,
        );
        let suggestions =
            suggest_risk_adjustments(&[pos], Decimal::from(1_000), &RiskLimits::default());
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].contains("reducing leverage or adding margin"));
        assert!(suggestions[1].contains("reducing SOL position size"));
    }
}
