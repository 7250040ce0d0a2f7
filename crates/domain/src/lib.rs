//! # Hiveport Domain
//!
//! Domain types and models for the Hive platform SDK.
//!
//! This crate contains:
//! - Domain data types (BearerToken, UserRecord, Page, UploadPolicy, etc.)
//! - Domain error types and Result definitions
//! - Response envelope for status-code-based consumption
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other hiveport crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod response;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use response::*;
pub use types::*;
