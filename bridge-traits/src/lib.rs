//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the host.
//! Each trait represents a capability the core requires but that is
//! implemented differently per platform (desktop, iOS, Android).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Streaming downloads of remote tracks
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Cache directory and file I/O
//! - [`MediaPlayer`](media::MediaPlayer) - The host's audio engine and its status events
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | HTTP + filesystem |
//! | iOS      | host app            | injected |
//! | Android  | host app            | injected |
//!
//! The media player is always injected by the host: the core ships no audio
//! output of its own.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep the context (URL, path,
//! status code) in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared as
//! `Arc<dyn Trait>` across async tasks.

pub mod error;
pub mod http;
pub mod media;
pub mod storage;

pub use error::BridgeError;

pub use http::{DynAsyncRead, HttpClient, HttpMethod, HttpRequest};
pub use media::{
    MediaEvent, MediaEventKind, MediaEventSender, MediaPlayer, MediaSessionId,
};
pub use storage::{DynAsyncWrite, FileSystemAccess};
