//! Upload policies and per-file outcome reports

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A short-lived, single-use credential set authorizing upload of exactly
/// one file to a specific storage location.
///
/// The form fields are opaque to the SDK beyond the obligation to attach
/// every one of them to the multipart request, unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPolicy {
    /// Storage URL the multipart POST is addressed to.
    pub upload_url: String,
    /// Policy-dictated form fields, attached verbatim before the file part.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Outcome of one file within an upload batch.
///
/// Entries are independent of each other and preserve batch input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUploadResult {
    pub file: PathBuf,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileUploadResult {
    pub fn succeeded(file: impl AsRef<Path>) -> Self {
        Self { file: file.as_ref().to_path_buf(), success: true, error: None }
    }

    pub fn failed(file: impl AsRef<Path>, error: impl Into<String>) -> Self {
        Self { file: file.as_ref().to_path_buf(), success: false, error: Some(error.into()) }
    }
}
