//! Storage and File System Abstractions
//!
//! Platform-agnostic file I/O used by the local track cache.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Boxed async writer handed back by [`FileSystemAccess::open_write_stream`].
pub type DynAsyncWrite = dyn tokio::io::AsyncWrite + Send + Unpin;

/// File system access trait
///
/// Abstracts file I/O operations to support different platforms:
/// - Desktop: Direct filesystem access
/// - iOS/Android: Sandboxed app directories
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn cached(fs: &dyn FileSystemAccess, name: &str) -> Result<bool> {
///     let cache_dir = fs.get_cache_directory().await?;
///     fs.exists(&cache_dir.join(name)).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Get the application's cache directory
    ///
    /// Files placed here may be removed by the host when storage is low.
    async fn get_cache_directory(&self) -> Result<PathBuf>;

    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Open a file for streaming writes, truncating any previous content
    async fn open_write_stream(&self, path: &Path) -> Result<Box<DynAsyncWrite>>;

    /// Move `from` to `to`, replacing `to` if it exists
    ///
    /// Implementations must make the replacement atomic when both paths live
    /// on the same volume.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;
}
