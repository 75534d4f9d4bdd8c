//! Signing-key retrieval for token verification.
//!
//! `KeySource` fetches a JWKS; `KeyCache` keeps the decoded keys and decides
//! when a refetch is due. Fetching never retries: a failed refresh leaves the
//! previous keys in place and reports the error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use reqwest::{Client, StatusCode, header};
use thiserror::Error;
use url::Url;

/// Used when the key endpoint sends no usable `Cache-Control: max-age`.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// An unknown `kid` only forces a refetch if the keys are at least this old.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("key endpoint request failed")]
    Http(#[from] reqwest::Error),
    #[error("key endpoint returned status {0}")]
    Status(u16),
    #[error("key endpoint unavailable: {0}")]
    Unavailable(String),
}

/// Result of asking a key source for its current key set.
#[derive(Debug, Clone)]
pub enum KeyFetch {
    Updated {
        jwks: JwkSet,
        etag: Option<String>,
        max_age: Option<Duration>,
    },
    NotModified {
        max_age: Option<Duration>,
    },
}

#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the current key set. `etag` is the tag of the set already held,
    /// if any, so the source may answer `NotModified`.
    async fn fetch(&self, etag: Option<&str>) -> Result<KeyFetch, KeySourceError>;
}

/// JWKS served over HTTPS, e.g. Google's securetoken endpoint.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    client: Client,
    url: Url,
}

impl HttpKeySource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeySourceError> {
        let client = Client::builder()
            .user_agent(concat!("auth-oracle/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self, etag: Option<&str>) -> Result<KeyFetch, KeySourceError> {
        let mut request = self.client.get(self.url.clone());
        if let Some(etag) = etag {
            request = request.header(header::IF_NONE_MATCH, etag);
        }

        let response = request.send().await?;
        let max_age = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age);

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(KeyFetch::NotModified { max_age });
        }
        if !response.status().is_success() {
            return Err(KeySourceError::Status(response.status().as_u16()));
        }

        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let jwks = response.json::<JwkSet>().await?;

        Ok(KeyFetch::Updated {
            jwks,
            etag,
            max_age,
        })
    }
}

/// Extracts `max-age` from a `Cache-Control` header value.
pub fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .map(str::trim)
        .filter_map(|directive| {
            let (name, value) = directive.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("max-age")
                .then(|| value.trim().trim_matches('"').parse::<u64>().ok())
                .flatten()
        })
        .next()
        .map(Duration::from_secs)
}

#[derive(Default)]
struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    etag: Option<String>,
    fetched_at: Option<Instant>,
    expires_at: Option<Instant>,
}

impl CachedKeys {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now < at)
    }

    fn refreshed_recently(&self, now: Instant) -> bool {
        self.fetched_at
            .is_some_and(|at| now.duration_since(at) < MIN_REFRESH_INTERVAL)
    }
}

pub struct KeyCache {
    source: Arc<dyn KeySource>,
    current: ArcSwap<CachedKeys>,
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.load();
        f.debug_struct("KeyCache")
            .field("key_ids", &current.keys.keys().collect::<Vec<_>>())
            .field("etag", &current.etag)
            .finish()
    }
}

impl KeyCache {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            current: ArcSwap::from_pointee(CachedKeys::default()),
        }
    }

    /// Looks up the key for `kid`, refetching when the cache is stale or the
    /// key is unknown. `Ok(None)` means the key set does not contain `kid`.
    pub async fn key(&self, kid: &str) -> Result<Option<DecodingKey>, KeySourceError> {
        let now = Instant::now();
        let cached = self.current.load();

        if cached.is_fresh(now) {
            if let Some(key) = cached.keys.get(kid) {
                return Ok(Some(key.clone()));
            }
            if cached.refreshed_recently(now) {
                return Ok(None);
            }
        }

        self.refresh().await?;
        Ok(self.current.load().keys.get(kid).cloned())
    }

    pub async fn refresh(&self) -> Result<(), KeySourceError> {
        let etag = self.current.load().etag.clone();
        let fetched = self.source.fetch(etag.as_deref()).await?;
        let now = Instant::now();

        let next = match fetched {
            KeyFetch::Updated {
                jwks,
                etag,
                max_age,
            } => CachedKeys {
                keys: decode_keys(&jwks),
                etag,
                fetched_at: Some(now),
                expires_at: Some(now + max_age.unwrap_or(DEFAULT_MAX_AGE)),
            },
            KeyFetch::NotModified { max_age } => {
                let previous = self.current.load();
                CachedKeys {
                    keys: previous.keys.clone(),
                    etag: previous.etag.clone(),
                    fetched_at: Some(now),
                    expires_at: Some(now + max_age.unwrap_or(DEFAULT_MAX_AGE)),
                }
            }
        };

        tracing::debug!(keys = next.keys.len(), "signing keys refreshed");
        self.current.store(Arc::new(next));
        Ok(())
    }
}

fn decode_keys(jwks: &JwkSet) -> HashMap<String, DecodingKey> {
    jwks.keys
        .iter()
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(err) => {
                    tracing::warn!(kid = %kid, error = %err, "skipping unusable signing key");
                    None
                }
            }
        })
        .collect()
}
