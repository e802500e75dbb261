use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::storage::FileStorage;

#[derive(Debug, Deserialize)]
struct StoredFile {
    url: String,
}

/// Hosted file-storage collaborator reached over HTTP: the bytes are
/// posted to the configured endpoint, which answers with the durable URL.
#[derive(Debug, Clone)]
pub struct RemoteStorage {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteStorage {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl FileStorage for RemoteStorage {
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("filename", filename)])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| CoreError::Upstream(format!("file storage unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(CoreError::Upstream(format!(
                "file storage rejected upload: {}",
                response.status()
            )));
        }

        let stored: StoredFile = response.json().await.map_err(|e| {
            CoreError::Upstream(format!("file storage returned an invalid response: {e}"))
        })?;
        debug!("file storage hosted {filename} at {}", stored.url);

        Ok(stored.url)
    }
}
