//! User-profile cache with single retry on credential invalidation
//!
//! Caches the authenticated user's profile per credential key with no
//! time-based expiry: entries are replaced only on an explicit fresh flag.
//! A user fetch rejected with a 403 signals a token revoked or expired
//! earlier than its embedded claim indicates, which the token cache's
//! proactive expiry check cannot detect, so the fetch is retried exactly
//! once with a forced-fresh token.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use hiveport_domain::{BearerToken, HiveError, Result, UserRecord};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::token_cache::TokenCache;
use super::{require_identity, CredentialKey};
use crate::graphql::GraphQlClient;

/// Fetches the current user's profile with a given token.
#[async_trait]
pub trait UserFetcher: Send + Sync {
    async fn fetch_user(&self, root: &str, token: &BearerToken) -> Result<UserRecord>;
}

/// User-profile cache layered on [`TokenCache`].
pub struct UserCache {
    tokens: Arc<TokenCache>,
    fetcher: Arc<dyn UserFetcher>,
    entries: Mutex<HashMap<CredentialKey, UserRecord>>,
}

impl UserCache {
    pub fn new(tokens: Arc<TokenCache>, fetcher: Arc<dyn UserFetcher>) -> Self {
        Self { tokens, fetcher, entries: Mutex::new(HashMap::new()) }
    }

    /// Get the user profile for the identity triple.
    ///
    /// Cached entries are returned indefinitely unless `force_fresh` is set.
    /// A 403 from the user fetch is retried once with a forced-fresh token;
    /// any other error propagates untouched.
    pub async fn get(
        &self,
        root: &str,
        key: &str,
        secret: &str,
        force_fresh: bool,
    ) -> Result<UserRecord> {
        require_identity(root, key, secret)?;
        let cache_key = CredentialKey::new(root, key, secret);

        if !force_fresh {
            if let Some(user) = self.entries.lock().await.get(&cache_key) {
                debug!("serving user record from cache");
                return Ok(user.clone());
            }
        }

        let token = self.tokens.get(root, key, secret, force_fresh).await?;
        let user = match self.fetcher.fetch_user(root, &token).await {
            Ok(user) => user,
            Err(HiveError::Api { code: 403, message }) => {
                warn!(%message, "user fetch rejected the token, retrying with a fresh one");
                let token = self.tokens.get(root, key, secret, true).await?;
                self.fetcher.fetch_user(root, &token).await?
            }
            Err(err) => return Err(err),
        };

        self.entries.lock().await.insert(cache_key, user.clone());
        Ok(user)
    }
}

const CURRENT_USER_QUERY: &str = "\
query currentUser {
  currentUser {
    id
    email
    displayName
    endpoints { id name url }
  }
}";

/// User fetcher backed by the platform's GraphQL endpoint.
pub struct GraphQlUserFetcher {
    gql: GraphQlClient,
}

impl GraphQlUserFetcher {
    pub fn new(gql: GraphQlClient) -> Self {
        Self { gql }
    }
}

#[async_trait]
impl UserFetcher for GraphQlUserFetcher {
    async fn fetch_user(&self, root: &str, token: &BearerToken) -> Result<UserRecord> {
        let data = self
            .gql
            .execute(root, Some(token), "currentUser", CURRENT_USER_QUERY, serde_json::json!({}))
            .await?;
        serde_json::from_value(data)
            .map_err(|err| HiveError::Internal(format!("malformed user record: {err}")))
    }
}
