//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{DynAsyncWrite, FileSystemAccess},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Provides async file I/O operations using:
/// - `tokio::fs` for async operations
/// - Platform-specific cache directory via `dirs`
pub struct TokioFileSystem {
    cache_dir: PathBuf,
}

impl TokioFileSystem {
    /// Create a new file system accessor using the platform cache directory
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("playback-core");

        Self { cache_dir }
    }

    /// Create a new file system accessor rooted at a custom cache directory
    pub fn with_cache_directory(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn get_cache_directory(&self) -> Result<PathBuf> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(Self::map_io_error)?;
            debug!(path = ?self.cache_dir, "Created cache directory");
        }
        Ok(self.cache_dir.clone())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn open_write_stream(&self, path: &Path) -> Result<Box<DynAsyncWrite>> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }

        let file = fs::File::create(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Opened file for writing");
        Ok(Box::new(file))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        // rename(2) replaces `to` atomically on the same filesystem
        fs::rename(from, to).await.map_err(Self::map_io_error)?;
        debug!(from = ?from, to = ?to, "Renamed file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_custom_cache_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let cache = root.path().join("nested").join("cache");
        let fs = TokioFileSystem::with_cache_directory(cache.clone());

        let cache_dir = fs.get_cache_directory().await.unwrap();
        assert_eq!(cache_dir, cache);
        assert!(fs.exists(&cache).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_stream_then_rename() {
        let root = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(root.path().to_path_buf());
        let partial = root.path().join("song.mp3.part");
        let target = root.path().join("song.mp3");

        let mut writer = fs.open_write_stream(&partial).await.unwrap();
        writer.write_all(b"ID3 audio").await.unwrap();
        writer.shutdown().await.unwrap();
        drop(writer);

        fs.rename(&partial, &target).await.unwrap();

        assert!(!fs.exists(&partial).await.unwrap());
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"ID3 audio");

        fs.delete_file(&target).await.unwrap();
        assert!(!fs.exists(&target).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_io_error() {
        let root = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(root.path().to_path_buf());

        let err = fs.delete_file(&root.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
