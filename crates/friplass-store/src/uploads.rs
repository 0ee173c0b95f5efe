//! Local-disk upload collaborator.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Ingen filer mottatt")]
    MissingFile,

    #[error("Upload failed: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// HTTP-style status for the failure.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingFile => 400,
            Self::Io(_) => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Public URL handed back to the client.
    pub url: String,
    pub path: PathBuf,
}

/// Uploaded files kept in one directory and served under `url_prefix`.
#[derive(Debug, Clone)]
pub struct LocalUploads {
    dir: PathBuf,
    url_prefix: String,
}

/// Extension from the client's file name, lowercased and limited to
/// alphanumerics; `jpg` when there is nothing usable.
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

impl LocalUploads {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `bytes` under a fresh `<millis>-<hex>.<ext>` name.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::MissingFile`] for an empty body, or
    /// [`UploadError::Io`] when the file cannot be written.
    pub async fn save(
        &self,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::MissingFile);
        }
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!(
            "{}-{:x}.{}",
            chrono::Utc::now().timestamp_millis(),
            rand::random::<u64>(),
            extension_of(file_name)
        );
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(file = %name, size = bytes.len(), "stored upload");
        Ok(StoredUpload {
            url: format!("{}/{name}", self.url_prefix),
            path,
        })
    }

    /// Map a public URL back to a file inside the upload directory.
    ///
    /// Anything outside the prefix, nested, or trying to climb out of the
    /// directory maps to `None`.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let rest = url.trim().strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let mut components = Path::new(rest).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !rest.contains('\\') => {
                Some(self.dir.join(name))
            }
            _ => None,
        }
    }

    /// Try to remove the file behind `url`.
    ///
    /// Failures are logged and discarded; the caller never learns whether
    /// the file was actually removed.
    pub async fn delete_best_effort(&self, url: &str) {
        let Some(path) = self.resolve(url) else {
            tracing::warn!(url, "refusing to delete upload outside the upload directory");
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "deleted upload"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not delete upload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_defaults_to_jpg() {
        assert_eq!(extension_of(Some("bilde.PNG")), "png");
        assert_eq!(extension_of(Some("bilde")), "jpg");
        assert_eq!(extension_of(Some("bilde.")), "jpg");
        assert_eq!(extension_of(Some("x.p/ng")), "jpg");
        assert_eq!(extension_of(None), "jpg");
    }

    #[test]
    fn resolve_rejects_traversal_and_foreign_urls() {
        let uploads = LocalUploads::new("/srv/uploads", "/uploads/");
        assert_eq!(
            uploads.resolve("/uploads/1-ab.jpg"),
            Some(PathBuf::from("/srv/uploads/1-ab.jpg"))
        );
        assert_eq!(uploads.resolve("/uploads/../secret.json"), None);
        assert_eq!(uploads.resolve("/uploads/a/b.jpg"), None);
        assert_eq!(uploads.resolve("/uploads/..\\x"), None);
        assert_eq!(uploads.resolve("/other/1.jpg"), None);
        assert_eq!(uploads.resolve("/uploads/"), None);
    }

    #[tokio::test]
    async fn save_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = LocalUploads::new(dir.path().join("up"), "/uploads");

        let stored = uploads.save(Some("kai.webp"), b"bytes").await.unwrap();
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with(".webp"));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"bytes");

        uploads.delete_best_effort(&stored.url).await;
        assert!(!stored.path.exists());

        // Second delete fails quietly.
        uploads.delete_best_effort(&stored.url).await;
    }

    #[tokio::test]
    async fn empty_body_is_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = LocalUploads::new(dir.path(), "/uploads");
        let err = uploads.save(Some("a.jpg"), b"").await.unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
