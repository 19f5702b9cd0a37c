//! Workspace facade crate.
//!
//! Re-exports the playback core so host applications can depend on a single
//! crate. The `desktop-shims` feature pulls in the service layer with the
//! reqwest and tokio-fs bridges.

pub use core_playback as playback;
pub use core_runtime as runtime;

#[cfg(feature = "service")]
pub use core_service as service;
