//! Oireachtas API client for fetching legislation data.
//!
//! This module provides a trait-based HTTP client for the Oireachtas open
//! data service. The trait abstraction enables:
//!
//! - Easy mocking in unit tests
//! - HTTP-level testing with a stub server in integration tests
//! - Swapping implementations (e.g., a fixture-backed client)
//!
//! # Example
//!
//! ```ignore
//! use oireachtas_bills_api::oireachtas::{HttpOireachtasClient, OireachtasApiClient};
//!
//! let client = HttpOireachtasClient::new("https://api.oireachtas.ie/v1");
//! let page = client.fetch_legislation(10, 0).await?;
//! println!("{} bills total", page.head.counts.bill_count);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::types::BillApiResponse;
use crate::config::OireachtasConfig;

/// Errors that can occur when calling the Oireachtas API.
#[derive(Debug, Error)]
pub enum OireachtasApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

impl OireachtasApiError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures and server-side errors are transient; client
    /// errors (4xx) and payloads that fail to decode are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(err) => !err.is_decode(),
            Self::ApiError { status, .. } => *status >= 500,
        }
    }
}

/// Trait for Oireachtas API operations.
///
/// Implementations fetch raw legislation pages from the upstream service.
/// Use `HttpOireachtasClient` for real HTTP calls, or `MockOireachtasClient`
/// for testing.
#[async_trait]
pub trait OireachtasApiClient: Send + Sync {
    /// Fetch one window of the legislation collection.
    ///
    /// `limit` is the maximum number of records to return and `skip` is the
    /// zero-based offset into the server-side ordering.
    async fn fetch_legislation(
        &self,
        limit: u32,
        skip: u64,
    ) -> Result<BillApiResponse, OireachtasApiError>;
}

/// HTTP-based implementation of `OireachtasApiClient`.
///
/// Makes real HTTP requests to the Oireachtas open data API.
pub struct HttpOireachtasClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOireachtasClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client with a custom `reqwest::Client` (for testing with custom config).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build a client from service configuration, applying the request timeout.
    pub fn from_config(config: &OireachtasConfig) -> Result<Self, OireachtasApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }
}

#[async_trait]
impl OireachtasApiClient for HttpOireachtasClient {
    async fn fetch_legislation(
        &self,
        limit: u32,
        skip: u64,
    ) -> Result<BillApiResponse, OireachtasApiError> {
        let url = format!("{}/legislation", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("limit", limit.to_string()), ("skip", skip.to_string())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OireachtasApiError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{BillApiResponse, OireachtasApiClient, OireachtasApiError};
    use async_trait::async_trait;

    /// Mock implementation of `OireachtasApiClient` for unit tests.
    ///
    /// Queue responses with `push_fetch_result` (consumed in order, so retry
    /// sequences can be scripted) and verify calls with `fetch_calls()`.
    /// When the queue is empty an empty payload is returned.
    pub struct MockOireachtasClient {
        fetch_results: Mutex<VecDeque<Result<BillApiResponse, OireachtasApiError>>>,
        fetch_calls: Mutex<Vec<(u32, u64)>>,
    }

    impl MockOireachtasClient {
        pub fn new() -> Self {
            Self {
                fetch_results: Mutex::new(VecDeque::new()),
                fetch_calls: Mutex::new(Vec::new()),
            }
        }

        /// Queue a result for the next unconsumed `fetch_legislation` call.
        pub fn push_fetch_result(&self, result: Result<BillApiResponse, OireachtasApiError>) {
            self.fetch_results.lock().unwrap().push_back(result);
        }

        /// Get all `(limit, skip)` pairs passed to `fetch_legislation`.
        pub fn fetch_calls(&self) -> Vec<(u32, u64)> {
            self.fetch_calls.lock().unwrap().clone()
        }
    }

    impl Default for MockOireachtasClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl OireachtasApiClient for MockOireachtasClient {
        async fn fetch_legislation(
            &self,
            limit: u32,
            skip: u64,
        ) -> Result<BillApiResponse, OireachtasApiError> {
            self.fetch_calls.lock().unwrap().push((limit, skip));

            self.fetch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(BillApiResponse::default()))
        }
    }
}
