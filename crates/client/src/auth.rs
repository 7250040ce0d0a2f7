//! Credential management
//!
//! Two layered caches sit between callers and the credential issuance
//! endpoint:
//!
//! - [`TokenCache`]: expiry-aware bearer-token cache with in-flight fetch
//!   de-duplication, keyed by (endpoint root, client key, client secret).
//! - [`UserCache`]: user-profile cache on top of the token cache, with no
//!   time-based expiry and a single retry on server-side credential
//!   invalidation.

pub mod issuer;
pub mod token_cache;
pub mod user_cache;

pub use issuer::{HttpTokenIssuer, TokenIssuer};
pub use token_cache::TokenCache;
pub use user_cache::{GraphQlUserFetcher, UserCache, UserFetcher};

use hiveport_domain::{HiveError, Result};

/// Composite cache key uniquely identifying a credential slot.
///
/// Lives only in process memory for the lifetime of a cache instance; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CredentialKey {
    root: String,
    key: String,
    secret: String,
}

impl CredentialKey {
    pub(crate) fn new(root: &str, key: &str, secret: &str) -> Self {
        Self { root: root.to_string(), key: key.to_string(), secret: secret.to_string() }
    }
}

/// Validate the identity triple before any I/O.
///
/// Violations fail synchronously with `InvalidArgument` so callers never
/// need to await to learn about a malformed call.
pub(crate) fn require_identity(root: &str, key: &str, secret: &str) -> Result<()> {
    if root.trim().is_empty() {
        return Err(HiveError::InvalidArgument("endpoint root must not be empty".to_string()));
    }
    if key.trim().is_empty() {
        return Err(HiveError::InvalidArgument("client key must not be empty".to_string()));
    }
    if secret.trim().is_empty() {
        return Err(HiveError::InvalidArgument("client secret must not be empty".to_string()));
    }
    Ok(())
}
