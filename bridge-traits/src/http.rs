//! HTTP Client Abstraction
//!
//! Provides the streaming download capability the track cache needs to pull
//! remote audio onto local storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// Boxed async reader handed back by streaming downloads.
pub type DynAsyncRead = dyn tokio::io::AsyncRead + Send + Unpin;

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// Async HTTP client trait
///
/// Implementations perform exactly one transfer per call. Retrying is left to
/// whoever issues the request.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
/// use tokio::io::AsyncReadExt;
///
/// async fn fetch(client: &dyn HttpClient) -> bridge_traits::error::Result<Vec<u8>> {
///     let mut reader = client
///         .download_stream(HttpRequest::get("https://host/a.mp3"))
///         .await?;
///     let mut body = Vec::new();
///     reader.read_to_end(&mut body).await?;
///     Ok(body)
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Start a download and return the response body as a byte stream.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - The server answers with a non-success status
    /// - Request times out
    async fn download_stream(&self, request: HttpRequest) -> Result<Box<DynAsyncRead>>;
}
