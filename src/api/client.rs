use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::state::filter::FilterState;

use super::download;
use super::error::ApiError;
use super::model::{FileListing, StorageStats, UploadFile, UploadOutcome};

/// Multipart field the backend reads the upload from
pub const UPLOAD_FIELD: &str = "file";

/// Operations the UI performs against the file storage API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileApi: Send + Sync {
    /// `POST /files/` as multipart
    async fn upload_file(&self, file: UploadFile) -> Result<UploadOutcome, ApiError>;

    /// `GET /files/` with every filter key forwarded as a query parameter
    async fn get_files(&self, filters: &FilterState) -> Result<FileListing, ApiError>;

    /// `DELETE /files/{id}/`
    async fn delete_file(&self, id: &str) -> Result<(), ApiError>;

    /// Fetch a file's bytes and save them locally, returning where they landed
    async fn download_file(&self, url: &str, filename: &str) -> Result<PathBuf, ApiError>;

    /// `GET /files/storage_stats/`
    async fn storage_stats(&self) -> Result<StorageStats, ApiError>;
}

/// Resolve a record's file URL against the API base.
/// Absolute URLs are used as-is.
pub fn resolve_file_url(base_url: &str, file_url: &str) -> String {
    if file_url.starts_with("http://") || file_url.starts_with("https://") {
        file_url.to_string()
    } else {
        format!("{}{}", base_url, file_url)
    }
}

/// `FileApi` over HTTP
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    download_dir: PathBuf,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            download_dir: config.download_dir.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body);
        tracing::warn!(status = status.as_u16(), error = %err, "request failed");
        Err(err)
    }
}

#[async_trait]
impl FileApi for ApiClient {
    async fn upload_file(&self, file: UploadFile) -> Result<UploadOutcome, ApiError> {
        let mime = file.mime_type();
        let size = file.content.len();
        tracing::info!(file = %file.file_name, size, %mime, "uploading");

        let part = Part::bytes(file.content)
            .file_name(file.file_name)
            .mime_str(&mime)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let resp = self
            .http
            .post(self.url("/files/"))
            .multipart(form)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        resp.json::<UploadOutcome>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_files(&self, filters: &FilterState) -> Result<FileListing, ApiError> {
        tracing::debug!(?filters, "listing files");
        let resp = self
            .http
            .get(self.url("/files/"))
            .query(&filters.query_pairs())
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let body = resp.bytes().await?;
        serde_json::from_slice::<FileListing>(&body).map_err(|e| {
            tracing::warn!(error = %e, "file listing could not be decoded");
            ApiError::Decode(e.to_string())
        })
    }

    async fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        tracing::info!(id, "deleting file");
        let resp = self
            .http
            .delete(self.url(&format!("/files/{}/", id)))
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    async fn download_file(&self, url: &str, filename: &str) -> Result<PathBuf, ApiError> {
        let full_url = resolve_file_url(&self.base_url, url);
        tracing::info!(url = %full_url, filename, "downloading");

        let resp = self.http.get(&full_url).send().await?;
        let resp = Self::check_status(resp).await?;
        let bytes = resp.bytes().await?;

        download::save_bytes(&self.download_dir, filename, &bytes).await
    }

    async fn storage_stats(&self) -> Result<StorageStats, ApiError> {
        let resp = self
            .http
            .get(self.url("/files/storage_stats/"))
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        resp.json::<StorageStats>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
