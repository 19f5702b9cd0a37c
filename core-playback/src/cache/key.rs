//! Mapping from remote URLs to cache file names.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Longest file extension carried over from the URL into a digest key.
const MAX_EXTENSION_LEN: usize = 8;

/// How a track URL becomes a file name inside the cache directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyStrategy {
    /// SHA-256 of the full URL plus the URL's file extension.
    ///
    /// Distinct URLs never share a cache file.
    #[default]
    UrlDigest,

    /// The last path segment of the URL, as is.
    ///
    /// Two URLs ending in the same file name share one cache entry.
    LastPathSegment,
}

impl CacheKeyStrategy {
    /// Derive the cache file name for `url`.
    pub fn file_name(&self, url: &str) -> Result<String> {
        let segment = last_path_segment(url)?;

        match self {
            CacheKeyStrategy::UrlDigest => {
                let digest = hex::encode(Sha256::digest(url.as_bytes()));
                Ok(match extension(segment) {
                    Some(ext) => format!("{}.{}", digest, ext),
                    None => digest,
                })
            }
            CacheKeyStrategy::LastPathSegment => match segment {
                "" | "." | ".." => Err(PlaybackError::InvalidUrl(format!(
                    "{} has no usable file name",
                    url
                ))),
                name if name.contains('\\') => Err(PlaybackError::InvalidUrl(format!(
                    "{} has an unsafe file name",
                    url
                ))),
                name => Ok(name.to_string()),
            },
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CacheKeyStrategy::UrlDigest => "Digest of the full URL",
            CacheKeyStrategy::LastPathSegment => "Last path segment of the URL",
        }
    }
}

/// Last segment of the URL path, without query or fragment.
fn last_path_segment(url: &str) -> Result<&str> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| PlaybackError::InvalidUrl(format!("{} is not an absolute URL", url)))?;

    if scheme.is_empty() || rest.is_empty() {
        return Err(PlaybackError::InvalidUrl(format!(
            "{} is not an absolute URL",
            url
        )));
    }

    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    // No path at all: "https://host"
    let Some((_, path)) = rest.split_once('/') else {
        return Ok("");
    };

    Ok(path.rsplit('/').next().unwrap_or_default())
}

fn extension(segment: &str) -> Option<&str> {
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext)
}
