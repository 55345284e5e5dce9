use std::sync::Arc;
use std::time::Duration;

use hyperwatch::api::router::create_router;
use hyperwatch::config::AppConfig;
use hyperwatch::hyperliquid::InfoClient;
use hyperwatch::services::{fill_poller, position_poller};
use hyperwatch::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics();

    // The exchange client is constructed once and injected into both pollers;
    // its TTL cache dedups reads within a polling cycle.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let client = Arc::new(InfoClient::with_base_url(
        http,
        config.hyperliquid_api_url.clone(),
        Duration::from_secs(config.cache_ttl_secs),
    ));

    tracing::info!(wallet = %config.wallet_address, "Starting pollers");

    {
        let pool = pool.clone();
        let client = client.clone();
        let wallet = config.wallet_address.clone();
        let limits = config.risk_limits.clone();
        let interval = config.poll_interval_secs;
        let write_interval = config.min_write_interval_secs;
        tokio::spawn(async move {
            position_poller::run_position_poller(
                pool,
                client,
                wallet,
                limits,
                interval,
                write_interval,
            )
            .await;
        });
    }

    {
        let pool = pool.clone();
        let client = client.clone();
        let wallet = config.wallet_address.clone();
        let interval = config.fill_poll_interval_secs;
        tokio::spawn(async move {
            fill_poller::run_fill_poller(pool, client, wallet, interval).await;
        });
    }

    let state = AppState {
        db: pool,
        config,
        client,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
