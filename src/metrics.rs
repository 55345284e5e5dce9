use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("poll_cycles_total").absolute(0);
    counter!("poll_cycles_failed").absolute(0);
    counter!("fills_ingested_total").absolute(0);
    counter!("fills_duplicate_total").absolute(0);
    counter!("snapshot_records_skipped").absolute(0);

    // Pre-register gauges at zero.
    gauge!("open_positions").set(0.0);
    gauge!("account_value").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("poll_cycle_seconds").record(0.0);

    handle
}
