//! Storage for SOS attachments.
//!
//! Files are written to [`ServerConfig::uploads_dir`](crate::config::ServerConfig)
//! under a random name and served back by the static `/uploads` route.

use std::path::Path;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// URL prefix attachments are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Maximum accepted request body for SOS submissions (attachments included).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Accepted attachment extensions (photos, short videos, voice notes).
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "mp4", "mov", "3gp", "webm", "m4a", "aac", "mp3",
];

/// An uploaded file held in memory until the request has been validated.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Lowercased extension of the client-supplied file name, if supported.
    pub fn extension(&self) -> AppResult<String> {
        let ext = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported media format '.{ext}'. Supported: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }
        Ok(ext)
    }
}

/// Write `upload` into `dir` and return its public path (`/uploads/<file>`).
pub async fn store(dir: &Path, upload: &Upload) -> AppResult<String> {
    let ext = upload.extension()?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create uploads dir: {e}")))?;

    let stored_name = format!("{}.{ext}", Uuid::new_v4());
    tokio::fs::write(dir.join(&stored_name), &upload.bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    tracing::debug!(file = %stored_name, bytes = upload.bytes.len(), "Stored SOS attachment");
    Ok(format!("{UPLOADS_ROUTE}/{stored_name}"))
}

/// Delete an attachment previously returned by [`store`].
///
/// Paths outside the uploads route are ignored. Failures are logged, not
/// returned: this runs on error paths that already have an error to report.
pub async fn discard(dir: &Path, public_path: &str) {
    let Some(stored_name) = public_path
        .strip_prefix(UPLOADS_ROUTE)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
    else {
        return;
    };

    match tokio::fs::remove_file(dir.join(stored_name)).await {
        Ok(()) => tracing::debug!(file = %stored_name, "Discarded SOS attachment"),
        Err(e) => {
            tracing::warn!(file = %stored_name, error = %e, "Failed to discard SOS attachment")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(upload("Scene.JPG").extension().unwrap(), "jpg");
    }

    #[test]
    fn unsupported_extension_rejected() {
        assert!(upload("payload.exe").extension().is_err());
        assert!(upload("no_extension").extension().is_err());
    }

    #[tokio::test]
    async fn store_writes_file_under_random_name() {
        let dir = std::env::temp_dir().join(format!("beacon-uploads-{}", Uuid::new_v4()));
        let path = store(&dir, &upload("photo.png")).await.unwrap();

        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));
        let file_name = path.trim_start_matches("/uploads/");
        let written = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(written, vec![0xFF, 0xD8, 0xFF]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn discard_removes_stored_file_only() {
        let dir = std::env::temp_dir().join(format!("beacon-uploads-{}", Uuid::new_v4()));
        let kept = store(&dir, &upload("kept.png")).await.unwrap();
        let dropped = store(&dir, &upload("dropped.png")).await.unwrap();

        discard(&dir, &dropped).await;
        // Outside the uploads route: left alone.
        discard(&dir, "/elsewhere/kept.png").await;
        discard(&dir, "/uploads/../kept.png").await;

        assert!(!dir.join(dropped.trim_start_matches("/uploads/")).exists());
        assert!(dir.join(kept.trim_start_matches("/uploads/")).exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
