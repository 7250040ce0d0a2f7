//! Bearer token with embedded expiry
//!
//! Tokens are opaque signed strings except for one decodable property: the
//! `exp` claim (seconds since epoch) embedded in the JWT payload segment.
//! Nothing else about the token format may be assumed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, time-limited credential string used to authenticate domain
/// operation calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode the expiry timestamp embedded in the token.
    ///
    /// Returns `None` when the token has no decodable `exp` claim; callers
    /// must treat such tokens as already stale.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let payload = self.0.split('.').nth(1)?;
        let raw = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: ExpiryClaim = serde_json::from_slice(&raw).ok()?;
        DateTime::from_timestamp(claims.exp, 0)
    }
}

impl From<String> for BearerToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Display for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
