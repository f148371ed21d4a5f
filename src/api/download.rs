/// Saving downloaded bytes into the downloads directory
///
/// Bytes are written to `<name>.part` next to the target and renamed into
/// place once complete. The partial file is owned by a guard that removes it
/// on every path that does not reach the rename.

use std::path::{Path, PathBuf};

use super::error::ApiError;

const FALLBACK_NAME: &str = "download";

/// Temporary file that deletes itself unless committed
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    async fn commit(mut self, target: &Path) -> Result<(), ApiError> {
        tokio::fs::rename(&self.path, target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            // Nothing may exist yet if the write failed early
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Reduce a server-supplied filename to a single safe path component
pub fn sanitize_filename(filename: &str) -> String {
    Path::new(filename.trim())
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// First path in `dir` for `name` that does not exist yet.
/// `report.pdf` becomes `report (1).pdf`, `report (2).pdf`, ...
async fn available_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !exists(&candidate).await {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    let extension = as_path.extension().map(|e| e.to_string_lossy().to_string());

    let mut n = 1u32;
    loop {
        let numbered = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(numbered);
        if !exists(&candidate).await {
            return candidate;
        }
        n += 1;
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Write `bytes` into `dir` under `filename`, returning the final path
pub async fn save_bytes(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(dir).await?;

    let name = sanitize_filename(filename);
    let target = available_path(dir, &name).await;
    let part_name = format!(
        "{}.part",
        target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(name)
    );
    let partial = PartialFile::new(dir.join(part_name));

    tokio::fs::write(&partial.path, bytes).await?;
    partial.commit(&target).await?;

    tracing::info!(path = %target.display(), bytes = bytes.len(), "download saved");
    Ok(target)
}
