/// Wire types exchanged with the file storage API
///
/// Everything here is server-owned: the client deserializes these values,
/// displays them and refers to them by id, but never edits them.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use super::error::ApiError;

/// Metadata and location of one stored file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique, stable id (a UUID on the reference backend)
    pub id: String,
    /// Filename as it was uploaded
    pub original_filename: String,
    /// MIME type reported at upload time
    pub file_type: String,
    /// Size in bytes
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    /// Download URL, absolute or relative to the API base
    pub file: String,
    /// SHA-256 of the content, null for legacy rows
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub is_duplicate: Option<bool>,
    #[serde(default)]
    pub original_file: Option<String>,
}

/// How the server classified an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Duplicate,
    Error,
}

/// Response body of `POST /files/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub status: UploadStatus,
    #[serde(default)]
    pub message: String,
    /// The stored file (for duplicates, the pre-existing one)
    #[serde(default)]
    pub file: Option<FileRecord>,
    #[serde(default)]
    pub existing_file: Option<FileRecord>,
    #[serde(default)]
    pub original_filename: Option<String>,
    /// Bytes not stored because the content already existed
    #[serde(default)]
    pub saved_bytes: Option<u64>,
}

impl UploadOutcome {
    /// Name of the file that already held this content
    pub fn existing_name(&self) -> Option<&str> {
        self.file
            .as_ref()
            .or(self.existing_file.as_ref())
            .map(|f| f.original_filename.as_str())
            .or(self.original_filename.as_deref())
    }

    /// Saved storage in MiB
    pub fn saved_megabytes(&self) -> f64 {
        self.saved_bytes.unwrap_or(0) as f64 / 1024.0 / 1024.0
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub results: Vec<FileRecord>,
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Response body of `GET /files/`
///
/// The backend answers either with a bare array or with a paginated
/// envelope depending on its pagination settings. The shape is decided
/// before any record is decoded: a recognized shape holding a bad record is
/// a decode error, and only a foreign shape is kept as raw JSON so the
/// caller can degrade to an empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum FileListing {
    Bare(Vec<FileRecord>),
    Page(Page),
    Unrecognized(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingShape {
    Bare(Vec<serde_json::Value>),
    Page {
        results: Vec<serde_json::Value>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
    Other(serde_json::Value),
}

fn decode_records(rows: Vec<serde_json::Value>) -> Result<Vec<FileRecord>, String> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row).map_err(|e| format!("file record {}: {}", index, e))
        })
        .collect()
}

impl<'de> Deserialize<'de> for FileListing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let listing = match ListingShape::deserialize(deserializer)? {
            ListingShape::Bare(rows) => {
                FileListing::Bare(decode_records(rows).map_err(D::Error::custom)?)
            }
            ListingShape::Page {
                results,
                count,
                next,
                previous,
            } => FileListing::Page(Page {
                results: decode_records(results).map_err(D::Error::custom)?,
                count,
                next,
                previous,
            }),
            ListingShape::Other(value) => FileListing::Unrecognized(value),
        };
        Ok(listing)
    }
}

impl FileListing {
    /// Flatten to an ordered sequence of records
    pub fn into_records(self) -> Vec<FileRecord> {
        match self {
            FileListing::Bare(records) => records,
            FileListing::Page(page) => {
                tracing::debug!(
                    count = ?page.count,
                    next = ?page.next,
                    previous = ?page.previous,
                    "paginated listing, using the first page"
                );
                page.results
            }
            FileListing::Unrecognized(value) => {
                tracing::warn!(%value, "unrecognized file listing shape, treating as empty");
                Vec::new()
            }
        }
    }
}

/// Response body of `GET /files/storage_stats/`
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct StorageStats {
    /// Bytes held by stored files
    #[serde(default)]
    pub total_used: u64,
    #[serde(default)]
    pub unique_files: u64,
    /// Bytes avoided through deduplication (may be fractional)
    #[serde(default)]
    pub saved_space: f64,
}

/// A local file ready to be sent as the multipart `file` field
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    /// Read a file from disk, keeping only its final path component as the name
    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self { file_name, content })
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "original_filename": name,
            "file_type": "image/jpeg",
            "size": 1024,
            "uploaded_at": "2023-01-01T00:00:00Z",
            "file": "http://test.com/file1"
        })
    }

    #[test]
    fn test_bare_array_listing() {
        let body = json!([record_json("1", "a.jpg"), record_json("2", "b.jpg")]);
        let listing: FileListing = serde_json::from_value(body).unwrap();

        assert!(matches!(listing, FileListing::Bare(_)));
        let records = listing.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original_filename, "a.jpg");
        assert_eq!(records[1].id, "2");
    }

    #[test]
    fn test_paginated_listing() {
        let body = json!({
            "count": 3,
            "next": "http://localhost:8000/api/files/?page=2",
            "previous": null,
            "results": [record_json("1", "a.jpg")]
        });
        let listing: FileListing = serde_json::from_value(body).unwrap();

        match &listing {
            FileListing::Page(page) => {
                assert_eq!(page.count, Some(3));
                assert!(page.next.is_some());
            }
            other => panic!("expected a page, got {:?}", other),
        }
        assert_eq!(listing.into_records().len(), 1);
    }

    #[test]
    fn test_unrecognized_listing_is_empty() {
        for body in [json!({"items": []}), json!({"results": "nope"}), json!("text"), json!(null)] {
            let listing: FileListing = serde_json::from_value(body).unwrap();
            assert!(matches!(listing, FileListing::Unrecognized(_)));
            assert!(listing.into_records().is_empty());
        }
    }

    #[test]
    fn test_bad_record_in_bare_array_is_a_decode_error() {
        let mut broken = record_json("2", "b.jpg");
        broken["file"] = json!(null);
        let body = json!([record_json("1", "a.jpg"), broken]);

        let err = serde_json::from_value::<FileListing>(body).unwrap_err();
        assert!(err.to_string().contains("file record 1"), "{}", err);
    }

    #[test]
    fn test_bad_record_in_page_is_a_decode_error() {
        let body = json!({"count": 1, "results": [{"id": "1"}]});
        let err = serde_json::from_value::<FileListing>(body).unwrap_err();
        assert!(err.to_string().contains("file record 0"), "{}", err);
    }

    #[test]
    fn test_duplicate_outcome() {
        let body = json!({
            "status": "duplicate",
            "message": "Duplicate found",
            "file": record_json("7", "a.png"),
            "saved_bytes": 2097152
        });
        let outcome: UploadOutcome = serde_json::from_value(body).unwrap();

        assert_eq!(outcome.status, UploadStatus::Duplicate);
        assert_eq!(outcome.existing_name(), Some("a.png"));
        assert_eq!(format!("{:.2}", outcome.saved_megabytes()), "2.00");
    }

    #[test]
    fn test_error_outcome_without_optional_fields() {
        let outcome: UploadOutcome =
            serde_json::from_value(json!({"status": "error", "message": "No file provided"})).unwrap();

        assert_eq!(outcome.status, UploadStatus::Error);
        assert!(outcome.file.is_none());
        assert_eq!(outcome.existing_name(), None);
        assert_eq!(outcome.saved_megabytes(), 0.0);
    }

    #[test]
    fn test_mime_type_guess() {
        let jpg = UploadFile { file_name: "test.jpg".into(), content: vec![1, 2, 3, 4] };
        assert_eq!(jpg.mime_type(), "image/jpeg");

        let unknown = UploadFile { file_name: "blob".into(), content: Vec::new() };
        assert_eq!(unknown.mime_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_read_upload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let file = UploadFile::read(&path).await.unwrap();
        assert_eq!(file.file_name, "notes.txt");
        assert_eq!(file.content, b"hello");
    }
}
