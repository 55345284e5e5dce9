use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::sleep;

use super::types::{AssetCtx, ClearinghouseState, Meta, RawFill};

const INFO_API_BASE: &str = "https://api.hyperliquid.xyz";

const MAX_ATTEMPTS: u32 = 4;
const BASE_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Read-only client for the Hyperliquid `/info` endpoint.
///
/// Every request carries the `reqwest::Client`'s bounded timeout and is
/// retried with capped exponential backoff; an error surfaces only once the
/// retries are exhausted. Responses are cached by request body for a short
/// TTL so repeated reads within one polling cycle do not refetch.
pub struct InfoClient {
    http: Client,
    base_url: String,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, (Instant, serde_json::Value)>>,
}

impl InfoClient {
    pub fn new(http: Client, cache_ttl: Duration) -> Self {
        Self::with_base_url(http, INFO_API_BASE, cache_ttl)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the clearinghouse state (positions + margin summary) for a wallet.
    pub async fn clearinghouse_state(
        &self,
        wallet: &str,
    ) -> Result<ClearinghouseState, ClientError> {
        let value = self
            .info_request(json!({ "type": "clearinghouseState", "user": wallet }))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch all fills for a wallet, newest first.
    pub async fn user_fills(&self, wallet: &str) -> Result<Vec<RawFill>, ClientError> {
        let value = self
            .info_request(json!({ "type": "userFills", "user": wallet }))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch market metadata and asset contexts in one request.
    /// The response is a two-element array `[meta, contexts]`.
    pub async fn meta_and_asset_ctxs(&self) -> Result<(Meta, Vec<AssetCtx>), ClientError> {
        let value = self
            .info_request(json!({ "type": "metaAndAssetCtxs" }))
            .await?;

        let parts = value
            .as_array()
            .filter(|a| a.len() >= 2)
            .ok_or_else(|| {
                ClientError::Unexpected("expected a two-element array".into())
            })?;

        let meta: Meta = serde_json::from_value(parts[0].clone())?;
        let ctxs: Vec<AssetCtx> = serde_json::from_value(parts[1].clone())?;
        Ok((meta, ctxs))
    }

    /// POST a payload to `/info`, serving from the TTL cache when fresh.
    /// Entries expire by wall-clock age only; there is no invalidation path.
    async fn info_request(
        &self,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let key = payload.to_string();

        {
            let cache = self.cache.lock().await;
            if let Some((at, value)) = cache.get(&key) {
                if at.elapsed() < self.cache_ttl {
                    return Ok(value.clone());
                }
            }
        }

        let value = self.post_with_retry(&payload).await?;

        let mut cache = self.cache.lock().await;
        cache.retain(|_, (at, _)| at.elapsed() < self.cache_ttl);
        cache.insert(key, (Instant::now(), value.clone()));

        Ok(value)
    }

    async fn post_with_retry(
        &self,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/info", self.base_url);
        let mut attempt: u32 = 0;

        loop {
            match self.post_once(&url, payload).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt + 1 >= MAX_ATTEMPTS {
                        return Err(e);
                    }

                    // Exponential backoff with cap
                    let delay = BASE_RETRY_DELAY * 2u32.saturating_pow(attempt);
                    let delay = delay.min(MAX_RETRY_DELAY);
                    attempt = attempt.saturating_add(1);
                    tracing::warn!(
                        error = %e,
                        delay_secs = delay.as_secs(),
                        attempt,
                        "Info request failed — retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn post_once(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let resp = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }
}
