//! Domain data types
//!
//! Typed shapes for the remote platform's payloads. Wire format is
//! camelCase JSON; field names are renamed accordingly.

pub mod page;
pub mod token;
pub mod upload;
pub mod user;

pub use page::{Page, PageInfo};
pub use token::BearerToken;
pub use upload::{FileUploadResult, UploadPolicy};
pub use user::{Consent, Endpoint, UserRecord};
