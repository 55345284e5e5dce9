use rust_decimal::Decimal;
use std::env;

use crate::models::RiskLimits;

const DEFAULT_API_URL: &str = "https://api.hyperliquid.xyz";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    /// Wallet whose positions are monitored (read-only, no credentials).
    pub wallet_address: String,
    pub hyperliquid_api_url: String,

    // Polling
    pub poll_interval_secs: u64,
    pub fill_poll_interval_secs: u64,
    pub min_write_interval_secs: u64,
    pub cache_ttl_secs: u64,

    /// Optional bearer token for the read API.
    pub api_token: Option<String>,

    pub risk_limits: RiskLimits,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            wallet_address: env::var("WALLET_ADDRESS")
                .map_err(|_| anyhow::anyhow!("WALLET_ADDRESS must be set"))?,
            hyperliquid_api_url: env::var("HYPERLIQUID_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.into()),

            poll_interval_secs: parse_u64("POLL_INTERVAL_SECS", 60),
            fill_poll_interval_secs: parse_u64("FILL_POLL_INTERVAL_SECS", 60),
            min_write_interval_secs: parse_u64("MIN_WRITE_INTERVAL_SECS", 60),
            cache_ttl_secs: parse_u64("CACHE_TTL_SECS", 30),

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),

            risk_limits: risk_limits_from_env(),
        };

        if config.poll_interval_secs == 0 || config.fill_poll_interval_secs == 0 {
            anyhow::bail!("poll intervals must be greater than zero");
        }

        Ok(config)
    }
}

fn parse_u64(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_decimal(var: &str, default: Decimal) -> Decimal {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Risk limits with per-field env overrides over the documented defaults.
fn risk_limits_from_env() -> RiskLimits {
    let defaults = RiskLimits::default();
    RiskLimits {
        max_position_size_usd: parse_decimal("MAX_POSITION_SIZE_USD", defaults.max_position_size_usd),
        max_leverage: parse_decimal("MAX_LEVERAGE", defaults.max_leverage),
        max_drawdown_pct: parse_decimal("MAX_DRAWDOWN_PCT", defaults.max_drawdown_pct),
        max_position_pct: parse_decimal("MAX_POSITION_PCT", defaults.max_position_pct),
        min_distance_to_liq: parse_decimal("MIN_DISTANCE_TO_LIQ", defaults.min_distance_to_liq),
        max_correlation: parse_decimal("MAX_CORRELATION", defaults.max_correlation),
        warn_margin_utilization: parse_decimal(
            "WARN_MARGIN_UTILIZATION",
            defaults.warn_margin_utilization,
        ),
        warn_portfolio_heat: parse_decimal("WARN_PORTFOLIO_HEAT", defaults.warn_portfolio_heat),
    }
}
