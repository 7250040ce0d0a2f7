//! Domain constants shared across the SDK

/// Seconds of remaining lifetime below which a cached token is considered
/// stale and refreshed proactively.
pub const DEFAULT_EXPIRY_TOLERANCE_SECS: i64 = 10;

/// Well-known destination endpoint name used when the requested upload
/// destination does not exist for the user.
pub const FALLBACK_ENDPOINT_NAME: &str = "flex";

/// Path suffix of the GraphQL endpoint, appended to the endpoint root.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Path suffix of the credential issuance endpoint.
pub const TOKEN_PATH: &str = "/token";
