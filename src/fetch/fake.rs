//! Scripted fetcher that serves canned responses without a network.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::RemoteFetcher;
use crate::error::{CacheError, Result};

/// One canned answer for a URL.
#[derive(Debug, Clone)]
pub struct FakeResponse {
    delay: Duration,
    outcome: std::result::Result<Value, u16>,
}

impl FakeResponse {
    /// Succeeds with `body`.
    pub fn json(body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(body),
        }
    }

    /// Fails with an HTTP error carrying `status`.
    pub fn status(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(status),
        }
    }

    /// Answers only after `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Fetcher that replays scripted responses per URL.
///
/// Responses queued for a URL are served in order; the last one repeats.
/// URLs with nothing queued answer 404.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    routes: Mutex<HashMap<String, VecDeque<FakeResponse>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for `url`.
    pub fn push(&self, url: &str, response: FakeResponse) {
        self.routes
            .lock()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Number of requests made for `url`.
    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    /// Number of requests made for any URL.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    fn next_response(&self, url: &str) -> Option<FakeResponse> {
        let mut routes = self.routes.lock();
        let queue = routes.get_mut(url)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl RemoteFetcher for FakeFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        *self.calls.lock().entry(url.to_string()).or_default() += 1;

        let Some(response) = self.next_response(url) else {
            return Err(CacheError::Http {
                status: 404,
                url: url.to_string(),
            });
        };

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        response.outcome.map_err(|status| CacheError::Http {
            status,
            url: url.to_string(),
        })
    }
}
