//! # Hiveport Client
//!
//! Async client SDK for the Hive consent-management and file-exchange
//! platform.
//!
//! The SDK wraps the platform's GraphQL endpoint behind typed operations and
//! provides the three mechanisms the rest of the surface is built on:
//!
//! - [`auth::TokenCache`] / [`auth::UserCache`]: credential caching with
//!   expiry-aware refresh, in-flight request de-duplication, and a single
//!   retry on server-side credential invalidation.
//! - [`paging::PagingResponse`]: a uniform cursor-paging contract over any
//!   page-fetching operation.
//! - [`upload::FileUploadOrchestrator`]: batched upload-policy issuance and
//!   concurrent multi-file upload with per-file outcome reporting.

pub mod auth;
pub mod client;
pub mod graphql;
pub mod http;
pub mod paging;
pub mod upload;
pub mod webhook;

pub use auth::{GraphQlUserFetcher, HttpTokenIssuer, TokenCache, TokenIssuer, UserCache, UserFetcher};
pub use client::{HiveClient, HiveConfig};
pub use graphql::GraphQlClient;
pub use http::HttpClient;
pub use paging::{PageFetcher, PageTurn, PagingResponse, Variables};
pub use upload::{
    FileUploadOrchestrator, GraphQlPolicyIssuer, HttpStorageTransport, PolicyIssuer,
    StorageTransport,
};
pub use webhook::{PayloadDecryptor, WebhookDelivery, WebhookHandler, WebhookHeaders};
