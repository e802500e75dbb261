use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::storage::FileStorage;

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Local-disk file storage. Files land in an uploads directory under a
/// generated name and are served statically by the HTTP layer.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
    public_base: String,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

#[async_trait]
impl FileStorage for DiskStorage {
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| {
                CoreError::InvalidInput("uploaded file must have an image extension".to_string())
            })?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CoreError::InvalidInput(format!(
                "unsupported image format: {extension}"
            )));
        }

        tokio::fs::create_dir_all(&self.root).await?;

        // Generated name, never the client-supplied one.
        let name = format!("{}.{extension}", Uuid::new_v4());
        let path = self.root.join(&name);
        tokio::fs::write(&path, bytes).await?;
        debug!("stored upload at {}", path.display());

        Ok(format!(
            "{}/uploads/{name}",
            self.public_base.trim_end_matches('/')
        ))
    }
}
