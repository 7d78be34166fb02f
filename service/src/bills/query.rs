//! Query execution against the upstream legislation API.
//!
//! Each request resolves to one of two strategies before any I/O happens:
//!
//! - **Paginated**: no search text. The upstream service pages server-side,
//!   so we request exactly the slice the caller asked for and trust the
//!   reported dataset total.
//! - **Search**: non-blank search text. The upstream service has no text
//!   search, so we fetch one wide window, filter it locally and paginate
//!   the filtered list. The total reflects the filtered matches.
//!
//! Fetches retry transient upstream failures with capped exponential
//! backoff. Resolved pages land in the [`QueryCache`] keyed by the full
//! parameter set, so repeating a query within the TTL does not touch the
//! network.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::cache::{QueryCache, QueryKey};
use super::transform::{transform_bills, Bill};
use crate::config::QueryConfig;
use crate::oireachtas::{BillApiResponse, OireachtasApiClient, OireachtasApiError};

/// A bill listing request as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillQuery {
    /// Zero-based page index.
    pub page: u32,
    pub page_size: u32,
    /// Free-text search; blank (after trimming) means plain pagination.
    pub search: String,
}

/// One page of results plus the total count for the whole query.
#[derive(Debug, Clone, PartialEq)]
pub struct BillPage {
    pub results: Vec<Bill>,
    /// Dataset total when paginating, match total when searching.
    pub total_count: u64,
}

/// How a query will be satisfied. Resolved once, before any fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Strategy {
    Paginated { page: u32, size: u32 },
    Search { text: String, page: u32, size: u32 },
}

impl Strategy {
    fn resolve(query: &BillQuery) -> Self {
        let trimmed = query.search.trim();
        if trimmed.is_empty() {
            Self::Paginated {
                page: query.page,
                size: query.page_size,
            }
        } else {
            Self::Search {
                text: trimmed.to_string(),
                page: query.page,
                size: query.page_size,
            }
        }
    }
}

/// Tunables for query execution.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    /// Upstream window size for search queries.
    pub search_window: u32,
    /// Retries after the first failed attempt.
    pub retries: u32,
    pub retry_base: Duration,
    pub retry_cap: Duration,
}

impl QuerySettings {
    /// Backoff before retry `attempt` (zero-based): base doubled per
    /// attempt, capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.retry_base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.retry_cap)
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            search_window: 200,
            retries: 2,
            retry_base: Duration::from_millis(1000),
            retry_cap: Duration::from_millis(30_000),
        }
    }
}

impl From<&QueryConfig> for QuerySettings {
    fn from(config: &QueryConfig) -> Self {
        Self {
            search_window: config.search_window,
            retries: config.retries,
            retry_base: Duration::from_millis(config.retry_base_ms),
            retry_cap: Duration::from_millis(config.retry_cap_ms),
        }
    }
}

/// Errors surfaced by [`QueryEngine::run`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// Page size of zero cannot form a request window
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Upstream fetch failed after exhausting the retry budget
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] OireachtasApiError),
}

/// Executes bill queries against an [`OireachtasApiClient`].
pub struct QueryEngine {
    client: Arc<dyn OireachtasApiClient>,
    cache: QueryCache,
    settings: QuerySettings,
}

impl QueryEngine {
    pub fn new(
        client: Arc<dyn OireachtasApiClient>,
        cache: QueryCache,
        settings: QuerySettings,
    ) -> Self {
        Self {
            client,
            cache,
            settings,
        }
    }

    /// Resolve a query to a page of bills, consulting the cache first.
    pub async fn run(&self, query: &BillQuery) -> Result<BillPage, QueryError> {
        if query.page_size == 0 {
            return Err(QueryError::InvalidPageSize);
        }

        let key = QueryKey {
            page: query.page,
            page_size: query.page_size,
            search: query.search.trim().to_string(),
        };

        if let Some(page) = self.cache.get(&key).await {
            debug!(page = query.page, search = %key.search, "serving bills from cache");
            return Ok(page);
        }

        let page = match Strategy::resolve(query) {
            Strategy::Paginated { page, size } => self.fetch_paginated(page, size).await?,
            Strategy::Search { text, page, size } => self.fetch_search(&text, page, size).await?,
        };

        self.cache.insert(key, page.clone()).await;
        Ok(page)
    }

    async fn fetch_paginated(&self, page: u32, size: u32) -> Result<BillPage, QueryError> {
        let skip = u64::from(page).saturating_mul(u64::from(size));
        let response = self.fetch_with_retry(size, skip).await?;

        Ok(BillPage {
            results: transform_bills(&response),
            total_count: response.head.counts.bill_count,
        })
    }

    async fn fetch_search(&self, text: &str, page: u32, size: u32) -> Result<BillPage, QueryError> {
        let response = self.fetch_with_retry(self.settings.search_window, 0).await?;

        let needle = text.to_lowercase();
        let matches: Vec<Bill> = transform_bills(&response)
            .into_iter()
            .filter(|bill| matches_search(bill, &needle))
            .collect();

        let total_count = matches.len() as u64;
        let start = u64::from(page).saturating_mul(u64::from(size)) as usize;
        let results: Vec<Bill> = matches.into_iter().skip(start).take(size as usize).collect();

        Ok(BillPage {
            results,
            total_count,
        })
    }

    async fn fetch_with_retry(
        &self,
        limit: u32,
        skip: u64,
    ) -> Result<BillApiResponse, OireachtasApiError> {
        let mut attempt: u32 = 0;
        loop {
            match self.client.fetch_legislation(limit, skip).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.settings.retries && err.is_transient() => {
                    let delay = self.settings.delay_for(attempt);
                    warn!(attempt, ?delay, error = %err, "retrying legislation fetch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Case-insensitive substring match over the searchable bill fields.
///
/// `needle` must already be lowercased.
fn matches_search(bill: &Bill, needle: &str) -> bool {
    bill.bill_type.to_lowercase().contains(needle)
        || bill.bill_no.to_lowercase().contains(needle)
        || bill.sponsor.to_lowercase().contains(needle)
}
