//! Bearer-token cache with expiry-aware refresh and fetch de-duplication
//!
//! Tokens are cached per (endpoint root, client key, client secret) and
//! served from memory while their decoded expiry exceeds `now + tolerance`.
//! Concurrent cache misses for the same key share one underlying fetch: a
//! registry of pending shared futures guarantees at most one issuance call
//! is in flight per key, and every waiter observes that single outcome.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use hiveport_domain::constants::DEFAULT_EXPIRY_TOLERANCE_SECS;
use hiveport_domain::{BearerToken, Result};
use tokio::sync::Mutex;
use tracing::debug;

use super::issuer::TokenIssuer;
use super::{require_identity, CredentialKey};

type SharedFetch = Shared<BoxFuture<'static, Result<BearerToken>>>;

/// A cached token and its decoded expiry. Replaced wholesale on every
/// successful fetch, never partially updated.
struct CachedToken {
    token: BearerToken,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn new(token: BearerToken) -> Self {
        let expires_at = token.expiry();
        Self { token, expires_at }
    }

    /// A token with an undecodable expiry is never considered fresh.
    fn is_fresh(&self, tolerance: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Utc::now() > tolerance,
            None => false,
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CredentialKey, CachedToken>,
    /// Transient registry of pending fetches, used only to collapse
    /// concurrent duplicates. Entries are removed on settlement regardless
    /// of outcome.
    in_flight: HashMap<CredentialKey, SharedFetch>,
}

/// Expiry-aware, de-duplicating cache of bearer tokens.
pub struct TokenCache {
    issuer: Arc<dyn TokenIssuer>,
    tolerance: Duration,
    state: Arc<Mutex<CacheState>>,
}

impl TokenCache {
    /// Create a cache with the default expiry tolerance (10 seconds).
    pub fn new(issuer: Arc<dyn TokenIssuer>) -> Self {
        Self::with_tolerance(issuer, DEFAULT_EXPIRY_TOLERANCE_SECS)
    }

    /// Create a cache that refreshes tokens `tolerance_secs` before expiry.
    pub fn with_tolerance(issuer: Arc<dyn TokenIssuer>, tolerance_secs: i64) -> Self {
        Self {
            issuer,
            tolerance: Duration::seconds(tolerance_secs),
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Get a valid bearer token for the identity triple.
    ///
    /// Returns the cached token when it is still fresh, otherwise issues
    /// exactly one underlying fetch for this key; callers arriving while a
    /// fetch is in flight join it rather than starting another.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for empty identity parameters (before any I/O);
    /// issuer failures are propagated to every waiter and never cached.
    pub async fn get(
        &self,
        root: &str,
        key: &str,
        secret: &str,
        force_fresh: bool,
    ) -> Result<BearerToken> {
        require_identity(root, key, secret)?;
        let cache_key = CredentialKey::new(root, key, secret);

        let fetch = {
            let mut state = self.state.lock().await;

            if !force_fresh {
                if let Some(entry) = state.entries.get(&cache_key) {
                    if entry.is_fresh(self.tolerance) {
                        debug!("serving bearer token from cache");
                        return Ok(entry.token.clone());
                    }
                }
            }

            match state.in_flight.get(&cache_key) {
                Some(pending) => {
                    debug!("joining in-flight token fetch");
                    pending.clone()
                }
                None => {
                    let issuer = Arc::clone(&self.issuer);
                    let shared_state = Arc::clone(&self.state);
                    let fetch_key = cache_key.clone();
                    let (root, key, secret) =
                        (root.to_string(), key.to_string(), secret.to_string());

                    let fetch: SharedFetch = async move {
                        let outcome = issuer.issue(&root, &key, &secret).await;

                        let mut state = shared_state.lock().await;
                        state.in_flight.remove(&fetch_key);
                        match outcome {
                            Ok(token) => {
                                state.entries.insert(fetch_key, CachedToken::new(token.clone()));
                                Ok(token)
                            }
                            // Failed attempts are never cached.
                            Err(err) => Err(err),
                        }
                    }
                    .boxed()
                    .shared();

                    state.in_flight.insert(cache_key, fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }
}
