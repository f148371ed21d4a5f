/// Client for the file storage REST API
///
/// - `client.rs` - the `FileApi` seam and its HTTP implementation
/// - `model.rs` - wire types (records, upload outcomes, listings)
/// - `error.rs` - the single error shape every call fails with
/// - `download.rs` - writing downloaded bytes to disk

pub mod client;
pub mod download;
pub mod error;
pub mod model;

pub use client::{ApiClient, FileApi};
pub use error::ApiError;
pub use model::{FileListing, FileRecord, StorageStats, UploadFile, UploadOutcome, UploadStatus};

#[cfg(test)]
pub use client::MockFileApi;
