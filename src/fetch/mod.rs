//! Remote Fetch Module
//!
//! The GET-and-parse capability a collection cache fills itself from.
//!
//! - `HttpFetcher`: reqwest client with timeout and user agent from `Config`
//! - `FakeFetcher`: scripted responses per URL, for tests and offline use

mod fake;
mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use fake::{FakeFetcher, FakeResponse};
pub use http::HttpFetcher;

/// Issues a GET request and returns the parsed JSON body.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetches `url`.
    ///
    /// # Errors
    /// - `InvalidRoute` if `url` cannot be parsed
    /// - `Network` / `Timeout` on transport failure
    /// - `Http` on a non-success status
    /// - `Parse` if the body is not JSON
    async fn get_json(&self, url: &str) -> Result<Value>;
}
