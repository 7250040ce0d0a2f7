//! Client facade
//!
//! [`HiveClient`] wires the transports, caches, and orchestrators together
//! behind one configured entry point. Operations at this layer translate
//! into [`ApiResponse`] envelopes where the calling pattern benefits from
//! status-code branching; lower layers keep returning `Result`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use hiveport_domain::{
    ApiResponse, BearerToken, Consent, FileUploadResult, HiveError, Page, Result, UserRecord,
};
use serde_json::Value;
use tracing::debug;

use crate::auth::user_cache::GraphQlUserFetcher;
use crate::auth::{HttpTokenIssuer, TokenCache, UserCache};
use crate::graphql::GraphQlClient;
use crate::http::HttpClient;
use crate::paging::{PageFetcher, PagingResponse, Variables};
use crate::upload::{FileUploadOrchestrator, GraphQlPolicyIssuer, HttpStorageTransport};

/// Connection identity for one platform tenant.
#[derive(Clone)]
pub struct HiveConfig {
    /// Root URL of the platform (no trailing slash).
    pub endpoint_root: String,
    pub client_key: String,
    pub client_secret: String,
}

impl HiveConfig {
    pub fn new(
        endpoint_root: impl Into<String>,
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_root: endpoint_root.into(),
            client_key: client_key.into(),
            client_secret: client_secret.into(),
        }
    }
}

// The secret stays out of debug output.
impl std::fmt::Debug for HiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HiveConfig")
            .field("endpoint_root", &self.endpoint_root)
            .field("client_key", &self.client_key)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configured client for the Hive platform.
pub struct HiveClient {
    config: HiveConfig,
    gql: GraphQlClient,
    tokens: Arc<TokenCache>,
    users: Arc<UserCache>,
    uploader: FileUploadOrchestrator,
}

impl HiveClient {
    /// Build a client with the default HTTP stack.
    pub fn new(config: HiveConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!("hiveport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let gql = GraphQlClient::new(http.clone());
        let tokens = Arc::new(TokenCache::new(Arc::new(HttpTokenIssuer::new(http.clone()))));
        let users = Arc::new(UserCache::new(
            Arc::clone(&tokens),
            Arc::new(GraphQlUserFetcher::new(gql.clone())),
        ));
        let uploader = FileUploadOrchestrator::new(
            Arc::new(GraphQlPolicyIssuer::new(gql.clone())),
            Arc::new(HttpStorageTransport::new(http)),
        );

        Ok(Self { config, gql, tokens, users, uploader })
    }

    pub fn config(&self) -> &HiveConfig {
        &self.config
    }

    /// A valid bearer token for this client's identity.
    pub async fn access_token(&self, force_fresh: bool) -> Result<BearerToken> {
        self.tokens
            .get(
                &self.config.endpoint_root,
                &self.config.client_key,
                &self.config.client_secret,
                force_fresh,
            )
            .await
    }

    /// The authenticated user's profile.
    pub async fn current_user(&self, force_fresh: bool) -> Result<UserRecord> {
        self.users
            .get(
                &self.config.endpoint_root,
                &self.config.client_key,
                &self.config.client_secret,
                force_fresh,
            )
            .await
    }

    /// List consents, wrapped for cursor paging.
    ///
    /// `variables` are the static operation variables (filters, page size);
    /// pagination cursors are managed by the returned [`PagingResponse`].
    pub async fn consents(&self, variables: Variables) -> ApiResponse<PagingResponse<Consent>> {
        let fetcher: Arc<dyn PageFetcher<Consent>> = Arc::new(ConsentPageFetcher {
            gql: self.gql.clone(),
            tokens: Arc::clone(&self.tokens),
        });

        match fetcher.fetch_page(&self.config, &variables).await {
            Ok(page) => {
                ApiResponse::ok(PagingResponse::new(fetcher, self.config.clone(), variables, page))
            }
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    /// Upload files to one of the user's outbox endpoints.
    pub async fn upload_files(
        &self,
        destination: &str,
        files: &[PathBuf],
    ) -> Result<Vec<FileUploadResult>> {
        let token = self.access_token(false).await?;
        let user = self.current_user(false).await?;
        debug!(destination, files = files.len(), "uploading files");
        self.uploader
            .upload(&self.config.endpoint_root, &token, &user, destination, files)
            .await
    }
}

const CONSENTS_QUERY: &str = "\
query consents($first: Int, $after: String) {
  consents(first: $first, after: $after) {
    data { id purpose status }
    pageInfo { endCursor hasNextPage }
  }
}";

struct ConsentPageFetcher {
    gql: GraphQlClient,
    tokens: Arc<TokenCache>,
}

#[async_trait]
impl PageFetcher<Consent> for ConsentPageFetcher {
    async fn fetch_page(&self, config: &HiveConfig, variables: &Variables) -> Result<Page<Consent>> {
        let token = self
            .tokens
            .get(&config.endpoint_root, &config.client_key, &config.client_secret, false)
            .await?;
        let data = self
            .gql
            .execute(
                &config.endpoint_root,
                Some(&token),
                "consents",
                CONSENTS_QUERY,
                Value::Object(variables.clone()),
            )
            .await?;
        serde_json::from_value(data)
            .map_err(|err| HiveError::Internal(format!("malformed consents page: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_secret() {
        let config = HiveConfig::new("https://hive.example", "key-1", "very-secret");
        let printed = format!("{config:?}");
        assert!(printed.contains("key-1"));
        assert!(!printed.contains("very-secret"));
    }

    #[test]
    fn client_builds_with_defaults() {
        let client = HiveClient::new(HiveConfig::new("https://hive.example", "k", "s"));
        assert!(client.is_ok());
    }
}
