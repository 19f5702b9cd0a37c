//! # Local Track Cache
//!
//! Maps remote track URLs to complete local files.
//!
//! ## Overview
//!
//! - One file per derived cache key, no manifest
//! - Keys derived from the full URL digest by default, or the last path
//!   segment for compatibility with existing caches
//! - Atomic writes through a temporary file and rename
//! - No expiry, size cap or integrity check
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     LocalCacheStore                    │
//! │  - resolve()                           │
//! │  - is_cached()                         │
//! │  - stats()                             │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> CacheKeyStrategy (file names)
//!          ├──> FileSystemAccess (Storage)
//!          └──> HttpClient (Downloads)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::cache::{CacheConfig, LocalCacheStore};
//!
//! let store = LocalCacheStore::new(CacheConfig::default(), http_client, filesystem)?;
//! let resolved = store.resolve("https://host/a.mp3").await?;
//! println!("{} (hit: {})", resolved.path.display(), resolved.cache_hit);
//! ```

pub mod config;
pub mod key;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use config::CacheConfig;
pub use key::CacheKeyStrategy;
pub use stats::CacheStats;
pub use store::{LocalCacheStore, ResolvedTrack};
