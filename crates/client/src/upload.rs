//! Multi-file upload orchestration
//!
//! Uploading a batch is three steps: resolve the destination endpoint by
//! name (falling back to the well-known "flex" endpoint), request one
//! signed upload policy per file in a single batched call, then upload all
//! files concurrently. Individual file failures are captured per file and
//! never abort the batch; only a missing destination endpoint rejects the
//! whole call, before any policy request is made.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use hiveport_domain::constants::FALLBACK_ENDPOINT_NAME;
use hiveport_domain::{
    BearerToken, Endpoint, FileUploadResult, HiveError, Result, UploadPolicy, UserRecord,
};
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::graphql::GraphQlClient;
use crate::http::HttpClient;

/// Issues upload policies for a batch of files in one request.
///
/// The returned vector corresponds positionally to the input file names; a
/// `None` slot means the server declined to issue a policy for that file.
#[async_trait]
pub trait PolicyIssuer: Send + Sync {
    async fn issue_policies(
        &self,
        root: &str,
        token: &BearerToken,
        endpoint_id: &str,
        file_names: &[String],
    ) -> Result<Vec<Option<UploadPolicy>>>;
}

/// Performs the storage upload for one file under one policy.
#[async_trait]
pub trait StorageTransport: Send + Sync {
    async fn upload_file(&self, policy: &UploadPolicy, path: &Path) -> Result<()>;
}

/// Orchestrates batched policy issuance and concurrent file uploads.
pub struct FileUploadOrchestrator {
    policies: Arc<dyn PolicyIssuer>,
    storage: Arc<dyn StorageTransport>,
}

impl FileUploadOrchestrator {
    pub fn new(policies: Arc<dyn PolicyIssuer>, storage: Arc<dyn StorageTransport>) -> Self {
        Self { policies, storage }
    }

    /// Upload a batch of local files to a named destination endpoint.
    ///
    /// Returns one [`FileUploadResult`] per input file, in input order,
    /// regardless of how many individual uploads failed.
    ///
    /// # Errors
    ///
    /// `EndpointNotFound` when neither `destination` nor the fallback
    /// endpoint exists for the user; policy-batch failures also reject the
    /// whole call since no file can proceed without them.
    pub async fn upload(
        &self,
        root: &str,
        token: &BearerToken,
        user: &UserRecord,
        destination: &str,
        files: &[PathBuf],
    ) -> Result<Vec<FileUploadResult>> {
        let endpoint = resolve_endpoint(user, destination)?;
        info!(endpoint = %endpoint.name, files = files.len(), "starting upload batch");

        if files.is_empty() {
            return Ok(Vec::new());
        }

        let file_names: Vec<String> = files.iter().map(|path| display_name(path)).collect();
        let policies =
            self.policies.issue_policies(root, token, &endpoint.id, &file_names).await?;

        if policies.len() != files.len() {
            // Should not happen under correct server behavior; unmatched
            // files fail individually below.
            warn!(
                requested = files.len(),
                issued = policies.len(),
                "policy count does not match file count"
            );
        }

        let uploads = files.iter().enumerate().map(|(index, path)| {
            let policy = policies.get(index).cloned().flatten();
            let storage = Arc::clone(&self.storage);
            async move {
                match policy {
                    None => FileUploadResult::failed(path, "no upload policy issued for this file"),
                    Some(policy) => match storage.upload_file(&policy, path).await {
                        Ok(()) => {
                            debug!(file = %path.display(), "file uploaded");
                            FileUploadResult::succeeded(path)
                        }
                        Err(err) => {
                            warn!(file = %path.display(), error = %err, "file upload failed");
                            FileUploadResult::failed(path, err.message())
                        }
                    },
                }
            }
        });

        // All uploads run concurrently; join_all preserves input order.
        Ok(join_all(uploads).await)
    }
}

/// Resolve the destination endpoint by exact name, falling back to the
/// well-known default.
fn resolve_endpoint<'a>(user: &'a UserRecord, destination: &str) -> Result<&'a Endpoint> {
    user.endpoint_named(destination)
        .or_else(|| user.endpoint_named(FALLBACK_ENDPOINT_NAME))
        .ok_or_else(|| {
            HiveError::EndpointNotFound(format!(
                "no endpoint named {destination:?} or {FALLBACK_ENDPOINT_NAME:?} registered for user {}",
                user.id
            ))
        })
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |name| {
        name.to_string_lossy().into_owned()
    })
}

const CREATE_UPLOAD_POLICIES_MUTATION: &str = "\
mutation createUploadPolicies($endpointId: ID!, $fileNames: [String!]!) {
  createUploadPolicies(endpointId: $endpointId, fileNames: $fileNames) {
    uploadUrl
    fields
  }
}";

/// Policy issuer backed by the platform's GraphQL endpoint.
///
/// One batched mutation covers the whole file list; the reply preserves
/// positional correspondence with the request.
pub struct GraphQlPolicyIssuer {
    gql: GraphQlClient,
}

impl GraphQlPolicyIssuer {
    pub fn new(gql: GraphQlClient) -> Self {
        Self { gql }
    }
}

#[async_trait]
impl PolicyIssuer for GraphQlPolicyIssuer {
    async fn issue_policies(
        &self,
        root: &str,
        token: &BearerToken,
        endpoint_id: &str,
        file_names: &[String],
    ) -> Result<Vec<Option<UploadPolicy>>> {
        let data = self
            .gql
            .execute(
                root,
                Some(token),
                "createUploadPolicies",
                CREATE_UPLOAD_POLICIES_MUTATION,
                serde_json::json!({ "endpointId": endpoint_id, "fileNames": file_names }),
            )
            .await?;
        serde_json::from_value(data)
            .map_err(|err| HiveError::Internal(format!("malformed upload policies: {err}")))
    }
}

/// Storage transport performing the multipart POST a policy dictates.
pub struct HttpStorageTransport {
    http: HttpClient,
}

impl HttpStorageTransport {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl StorageTransport for HttpStorageTransport {
    async fn upload_file(&self, policy: &UploadPolicy, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| HiveError::Internal(format!("cannot read {}: {err}", path.display())))?;

        // Policy fields go first, verbatim, then the file part.
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &policy.fields {
            form = form.text(name.clone(), value.clone());
        }
        let file_part = reqwest::multipart::Part::bytes(bytes).file_name(display_name(path));
        form = form.part("file", file_part);

        let request = self.http.request(Method::POST, &policy.upload_url).multipart(form);
        let response = self.http.send(request).await?;

        let status = response.status();
        if status.as_u16() >= 300 {
            return Err(HiveError::Api {
                code: status.as_u16(),
                message: format!("storage upload returned status {status}"),
            });
        }
        Ok(())
    }
}
