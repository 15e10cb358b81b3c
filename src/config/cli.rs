use crate::core::{ImagePayload, ImageSource, Storage};
use crate::domain::model::{mime_for_path, DEFAULT_IMAGE_MIME};
use crate::utils::error::Result;
use std::path::Path;

/// 本機檔案系統：圖片依給定路徑讀取，報告寫到 `base_path` 之下
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl ImageSource for LocalStorage {
    async fn load_image(&self, path: &str) -> Result<ImagePayload> {
        let path = Path::new(path);
        let bytes = tokio::fs::read(path).await?;

        let mime_type = mime_for_path(path).unwrap_or_else(|| {
            tracing::warn!(
                "Unrecognized image extension for {}, sending as {}",
                path.display(),
                DEFAULT_IMAGE_MIME
            );
            DEFAULT_IMAGE_MIME
        });

        tracing::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
        Ok(ImagePayload::from_bytes(&bytes, mime_type))
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_image_detects_mime() {
        let temp_dir = TempDir::new().unwrap();
        let image_path = temp_dir.path().join("chart.jpg");
        std::fs::write(&image_path, b"hello").unwrap();

        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().into_owned());
        let payload = storage
            .load_image(image_path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.data, "aGVsbG8=");
        assert_eq!(payload.byte_len, 5);
    }

    #[tokio::test]
    async fn test_load_missing_image_fails() {
        let storage = LocalStorage::new(".".to_string());
        assert!(storage.load_image("/definitely/not/here.png").await.is_err());
    }

    #[tokio::test]
    async fn test_write_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("reports");
        let storage = LocalStorage::new(base.to_string_lossy().into_owned());

        let written = storage.write_file("report.txt", "命宫".as_bytes()).await.unwrap();

        assert!(written.ends_with("report.txt"));
        assert_eq!(std::fs::read_to_string(base.join("report.txt")).unwrap(), "命宫");
    }
}
