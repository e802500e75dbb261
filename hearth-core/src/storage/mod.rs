//! The external file-storage collaborator: turns uploaded bytes into
//! durable, publicly fetchable URLs.

pub mod disk;
pub mod remote;

use async_trait::async_trait;

use crate::error::Result;

pub use disk::DiskStorage;
pub use remote::RemoteStorage;

/// Converts uploaded bytes into a hosted URL.
///
/// Listing creation acquires the URL through this port before anything is
/// persisted; a failure here aborts the whole create with no partial
/// state.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}
