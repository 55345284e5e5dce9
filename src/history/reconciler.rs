use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Fill, PositionRow};

/// A half-open request window, both bounds in UTC.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The last `duration` up to now.
    pub fn trailing(duration: Duration) -> Self {
        let end = Utc::now();
        Self {
            start: end - duration,
            end,
        }
    }
}

/// One reconciled cell of the time-aligned series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub coin: String,
    /// Last-observation-carried-forward from snapshots; 0 before the first.
    pub unrealized_pnl: Decimal,
    /// Cumulative sum of closed_pnl over all fills at or before this point.
    pub realized_pnl: Decimal,
    pub is_open: bool,
}

/// Merge persisted position snapshots and fill events into one continuous,
/// time-aligned series per (timestamp, coin).
///
/// Realized PnL at any grid point T is exactly the sum of closed_pnl over
/// fills with timestamp ≤ T, independent of the grid resolution. Unrealized
/// PnL and the open flag carry the last snapshot observation forward. The
/// open flag is a derived view: a coin absent from the newest snapshot batch
/// is reported closed on every row, while the stored facts are never touched.
///
/// No snapshots in the window yields an empty series (not an error); no
/// fills yields a flat-zero realized curve. A non-positive resolution also
/// yields an empty series.
pub fn reconcile(
    snapshots: &[PositionRow],
    fills: &[Fill],
    window: Window,
    resolution: Duration,
) -> Vec<HistoryPoint> {
    if snapshots.is_empty() || resolution <= Duration::zero() {
        return Vec::new();
    }

    let realized_curves = realized_pnl_curves(fills);
    let snapshot_curves = snapshot_curves(snapshots);
    let open_coins = newest_batch_coins(snapshots);

    // Outer join: every coin seen in either source gets a series.
    let coins: BTreeSet<&str> = snapshot_curves
        .keys()
        .map(String::as_str)
        .chain(realized_curves.keys().map(String::as_str))
        .collect();

    let grid = build_grid(window, resolution);
    let mut points = Vec::with_capacity(grid.len() * coins.len());

    for coin in coins {
        let realized = realized_curves.get(coin);
        let observed = snapshot_curves.get(coin);
        let coin_open_in_newest = open_coins.contains(coin);

        let mut realized_idx = 0usize;
        let mut realized_at = Decimal::ZERO;
        let mut observed_idx = 0usize;
        let mut unrealized_at = Decimal::ZERO;
        let mut seen_snapshot = false;

        for &t in &grid {
            if let Some(curve) = realized {
                while realized_idx < curve.len() && curve[realized_idx].0 <= t {
                    realized_at = curve[realized_idx].1;
                    realized_idx += 1;
                }
            }

            if let Some(curve) = observed {
                while observed_idx < curve.len() && curve[observed_idx].0 <= t {
                    unrealized_at = curve[observed_idx].1;
                    seen_snapshot = true;
                    observed_idx += 1;
                }
            }

            points.push(HistoryPoint {
                timestamp: t,
                coin: coin.to_string(),
                unrealized_pnl: unrealized_at,
                realized_pnl: realized_at,
                is_open: seen_snapshot && coin_open_in_newest,
            });
        }
    }

    points.sort_by(|a, b| (a.timestamp, a.coin.as_str()).cmp(&(b.timestamp, b.coin.as_str())));
    points
}

/// Per coin, the cumulative realized-PnL curve: fills deduplicated by
/// fill_id, sorted by timestamp, closed_pnl prefix-summed.
fn realized_pnl_curves(fills: &[Fill]) -> BTreeMap<String, Vec<(DateTime<Utc>, Decimal)>> {
    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(fills.len());
    let mut per_coin: BTreeMap<String, Vec<(DateTime<Utc>, Decimal)>> = BTreeMap::new();

    for fill in fills {
        // Duplicates are dropped outright; fills are immutable facts.
        if !seen_ids.insert(&fill.fill_id) {
            continue;
        }
        per_coin
            .entry(fill.coin.clone())
            .or_default()
            .push((fill.filled_at, fill.closed_pnl));
    }

    for curve in per_coin.values_mut() {
        curve.sort_by_key(|(t, _)| *t);
        let mut cumulative = Decimal::ZERO;
        for (_, pnl) in curve.iter_mut() {
            cumulative += *pnl;
            *pnl = cumulative;
        }
    }

    per_coin
}

/// Per coin, the observed unrealized-PnL curve, sorted by timestamp.
/// Duplicate (timestamp, coin) rows are distinct sub-lots of the same coin:
/// their unrealized PnL sums.
fn snapshot_curves(snapshots: &[PositionRow]) -> BTreeMap<String, Vec<(DateTime<Utc>, Decimal)>> {
    let mut per_coin: BTreeMap<String, BTreeMap<DateTime<Utc>, Decimal>> = BTreeMap::new();

    for row in snapshots {
        let at_time = per_coin.entry(row.coin.clone()).or_default();
        *at_time.entry(row.snapshot_at).or_insert(Decimal::ZERO) += row.unrealized_pnl;
    }

    per_coin
        .into_iter()
        .map(|(coin, curve)| (coin, curve.into_iter().collect()))
        .collect()
}

/// Coins present in the newest snapshot batch. Anything else is closed.
fn newest_batch_coins(snapshots: &[PositionRow]) -> BTreeSet<String> {
    let Some(newest) = snapshots.iter().map(|r| r.snapshot_at).max() else {
        return BTreeSet::new();
    };

    snapshots
        .iter()
        .filter(|r| r.snapshot_at == newest)
        .map(|r| r.coin.clone())
        .collect()
}

fn build_grid(window: Window, resolution: Duration) -> Vec<DateTime<Utc>> {
    let mut grid = Vec::new();
    let mut t = window.start;
    while t <= window.end {
        grid.push(t);
        t += resolution;
    }
    grid
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn snapshot(coin: &str, minute: u32, upnl: i64) -> PositionRow {
        PositionRow {
            id: Uuid::new_v4(),
            coin: coin.into(),
            side: "long".into(),
            size: Decimal::ONE,
            leverage: Decimal::from(10),
            entry_price: Decimal::from(100),
            liquidation_price: Decimal::from(90),
            unrealized_pnl: Decimal::from(upnl),
            realized_pnl: Decimal::ZERO,
            margin_used: Decimal::from(10),
            snapshot_at: ts(minute),
        }
    }

    fn fill(id: &str, coin: &str, minute: u32, closed_pnl: i64) -> Fill {
        Fill {
            fill_id: id.into(),
            order_id: "1".into(),
            coin: coin.into(),
            side: "sell".into(),
            size: Decimal::ONE,
            price: Decimal::from(100),
            closed_pnl: Decimal::from(closed_pnl),
            filled_at: ts(minute),
        }
    }

    fn minute_window(from: u32, to: u32) -> Window {
        Window::new(ts(from), ts(to))
    }

    #[test]
    fn test_zero_fills_two_snapshots() {
        let snapshots = vec![snapshot("BTC", 0, 10), snapshot("BTC", 1, 20)];
        let series = reconcile(&snapshots, &[], minute_window(0, 1), Duration::minutes(1));

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].unrealized_pnl, Decimal::from(10));
        assert_eq!(series[0].realized_pnl, Decimal::ZERO);
        assert_eq!(series[1].unrealized_pnl, Decimal::from(20));
        assert_eq!(series[1].realized_pnl, Decimal::ZERO);
        assert!(series.iter().all(|p| p.is_open));
    }

    #[test]
    fn test_no_snapshots_yields_empty_result() {
        let fills = vec![fill("f1", "BTC", 0, 100)];
        let series = reconcile(&[], &fills, minute_window(0, 10), Duration::minutes(1));
        assert!(series.is_empty());
    }

    #[test]
    fn test_realized_is_cumulative_sum_at_or_before_t() {
        let snapshots = vec![
            snapshot("BTC", 0, 0),
            snapshot("BTC", 10, 0),
        ];
        let fills = vec![
            fill("f1", "BTC", 2, 100),
            fill("f2", "BTC", 5, -30),
            fill("f3", "BTC", 9, 7),
        ];

        let series = reconcile(&snapshots, &fills, minute_window(0, 10), Duration::minutes(1));
        let at = |minute: u32| {
            series
                .iter()
                .find(|p| p.timestamp == ts(minute))
                .expect("grid point")
                .realized_pnl
        };

        assert_eq!(at(0), Decimal::ZERO); // before the first fill
        assert_eq!(at(2), Decimal::from(100));
        assert_eq!(at(4), Decimal::from(100));
        assert_eq!(at(5), Decimal::from(70));
        assert_eq!(at(9), Decimal::from(77));
        assert_eq!(at(10), Decimal::from(77));
    }

    #[test]
    fn test_realized_independent_of_grid_resolution() {
        let snapshots = vec![snapshot("BTC", 0, 0), snapshot("BTC", 30, 0)];
        let fills = vec![
            fill("f1", "BTC", 3, 50),
            fill("f2", "BTC", 17, 25),
            fill("f3", "BTC", 29, -10),
        ];

        for minutes in [1i64, 5, 15, 30] {
            let series = reconcile(
                &snapshots,
                &fills,
                minute_window(0, 30),
                Duration::minutes(minutes),
            );
            let last = series.last().expect("non-empty");
            assert_eq!(last.timestamp, ts(30));
            assert_eq!(
                last.realized_pnl,
                Decimal::from(65),
                "Σ closed_pnl ≤ T must not depend on resolution ({minutes}m grid)"
            );
        }
    }

    #[test]
    fn test_duplicate_fill_ids_are_dropped() {
        let snapshots = vec![snapshot("BTC", 0, 0), snapshot("BTC", 5, 0)];
        let fills = vec![
            fill("f1", "BTC", 1, 40),
            fill("f1", "BTC", 1, 40), // redelivered
            fill("f2", "BTC", 3, 10),
        ];

        let series = reconcile(&snapshots, &fills, minute_window(0, 5), Duration::minutes(1));
        assert_eq!(series.last().unwrap().realized_pnl, Decimal::from(50));
    }

    #[test]
    fn test_locf_gaps_before_first_snapshot_are_zero_closed() {
        let snapshots = vec![snapshot("BTC", 5, 42), snapshot("BTC", 8, 42)];
        let series = reconcile(&snapshots, &[], minute_window(0, 8), Duration::minutes(1));

        let before = series.iter().find(|p| p.timestamp == ts(3)).unwrap();
        assert_eq!(before.unrealized_pnl, Decimal::ZERO);
        assert!(!before.is_open);

        let after = series.iter().find(|p| p.timestamp == ts(6)).unwrap();
        assert_eq!(after.unrealized_pnl, Decimal::from(42));
        assert!(after.is_open);
    }

    #[test]
    fn test_sub_lots_sum_and_or() {
        let mut a = snapshot("BTC", 2, 10);
        let b = snapshot("BTC", 2, 15);
        a.side = "short".into();
        let snapshots = vec![a, b, snapshot("BTC", 4, 30)];

        let series = reconcile(&snapshots, &[], minute_window(0, 4), Duration::minutes(1));
        let at2 = series.iter().find(|p| p.timestamp == ts(2)).unwrap();
        assert_eq!(at2.unrealized_pnl, Decimal::from(25));
        assert!(at2.is_open);
    }

    #[test]
    fn test_back_marking_closes_coin_absent_from_newest_batch() {
        // ETH is present at t0 and t1, gone from the newest batch at t2.
        let snapshots = vec![
            snapshot("BTC", 0, 5),
            snapshot("ETH", 0, 7),
            snapshot("BTC", 1, 6),
            snapshot("ETH", 1, 8),
            snapshot("BTC", 2, 9),
        ];

        let series = reconcile(&snapshots, &[], minute_window(0, 2), Duration::minutes(1));

        let eth: Vec<&HistoryPoint> = series.iter().filter(|p| p.coin == "ETH").collect();
        assert_eq!(eth.len(), 3);
        assert!(eth.iter().all(|p| !p.is_open), "every ETH row reads closed");
        // Other fields of earlier rows are untouched by the flag.
        assert_eq!(eth[0].unrealized_pnl, Decimal::from(7));
        assert_eq!(eth[1].unrealized_pnl, Decimal::from(8));

        let btc: Vec<&HistoryPoint> = series.iter().filter(|p| p.coin == "BTC").collect();
        assert!(btc.iter().all(|p| p.is_open));
    }

    #[test]
    fn test_coin_with_fills_but_no_snapshots_joins_closed() {
        let snapshots = vec![snapshot("BTC", 0, 1), snapshot("BTC", 2, 1)];
        let fills = vec![fill("f1", "SOL", 1, 12)];

        let series = reconcile(&snapshots, &fills, minute_window(0, 2), Duration::minutes(1));
        let sol: Vec<&HistoryPoint> = series.iter().filter(|p| p.coin == "SOL").collect();
        assert_eq!(sol.len(), 3);
        assert!(sol.iter().all(|p| !p.is_open));
        assert_eq!(sol[0].realized_pnl, Decimal::ZERO);
        assert_eq!(sol[1].realized_pnl, Decimal::from(12));
        assert_eq!(sol[2].unrealized_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_output_ordered_by_timestamp_then_coin() {
        let snapshots = vec![
            snapshot("ETH", 0, 1),
            snapshot("BTC", 0, 1),
            snapshot("ETH", 1, 1),
            snapshot("BTC", 1, 1),
        ];
        let series = reconcile(&snapshots, &[], minute_window(0, 1), Duration::minutes(1));

        let keys: Vec<(DateTime<Utc>, &str)> = series
            .iter()
            .map(|p| (p.timestamp, p.coin.as_str()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], (ts(0), "BTC"));
        assert_eq!(keys[1], (ts(0), "ETH"));
    }

    #[test]
    fn test_non_positive_resolution_yields_empty() {
        let snapshots = vec![snapshot("BTC", 0, 1)];
        let series = reconcile(&snapshots, &[], minute_window(0, 5), Duration::zero());
        assert!(series.is_empty());
    }
}
