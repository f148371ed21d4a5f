/// Async work launched from `update`
///
/// Each function owns everything it needs (an `Arc` of the API, cloned
/// arguments) so it can run as an iced `Task` on the tokio executor, and
/// returns whatever the matching message needs to route the result.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiError, FileApi, FileRecord, StorageStats, UploadFile, UploadOutcome};
use crate::state::listing::ListTicket;
use crate::state::upload::SelectedFile;

/// Fetch the listing for `ticket`, flattening the response shape here so
/// nothing downstream has to care which one the server used
pub async fn fetch_files(
    api: Arc<dyn FileApi>,
    ticket: ListTicket,
) -> (ListTicket, Result<Vec<FileRecord>, ApiError>) {
    let result = api
        .get_files(&ticket.key)
        .await
        .map(|listing| listing.into_records());
    (ticket, result)
}

/// Read the selected file from disk and upload it
pub async fn upload(api: Arc<dyn FileApi>, file: SelectedFile) -> Result<UploadOutcome, ApiError> {
    let mut upload = UploadFile::read(&file.path).await?;
    upload.file_name = file.name;
    api.upload_file(upload).await
}

pub async fn delete(api: Arc<dyn FileApi>, id: String) -> (String, Result<(), ApiError>) {
    let result = api.delete_file(&id).await;
    (id, result)
}

pub async fn download(
    api: Arc<dyn FileApi>,
    url: String,
    filename: String,
) -> Result<PathBuf, ApiError> {
    api.download_file(&url, &filename).await
}

pub async fn storage_stats(api: Arc<dyn FileApi>) -> Result<StorageStats, ApiError> {
    api.storage_stats().await
}

/// Show the native file picker and describe the chosen file
pub async fn pick_file() -> Option<Result<SelectedFile, String>> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Select a file to upload")
        .pick_file()
        .await?;

    Some(describe_file(handle.path().to_path_buf()).await)
}

/// Build a selection from a path on disk
pub async fn describe_file(path: PathBuf) -> Result<SelectedFile, String> {
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;

    if !metadata.is_file() {
        return Err(format!("{} is not a file", path.display()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(SelectedFile {
        path,
        name,
        size: metadata.len(),
    })
}
