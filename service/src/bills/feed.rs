//! Live bill query feed: debounced input handling and result publication.
//!
//! A feed owns one evolving query (page, page size, search text) and a
//! [`watch`] channel of [`QuerySnapshot`]s. Inputs arrive over an mpsc
//! channel:
//!
//! - search edits are buffered and only commit after a quiet period, so a
//!   burst of keystrokes issues at most one query;
//! - page and page-size changes apply immediately.
//!
//! Every issued query carries a generation number. Only the result of the
//! most recently issued query is applied to the snapshot; responses to
//! superseded queries are discarded, so a slow early response can never
//! overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::query::{BillQuery, QueryEngine};
use super::transform::Bill;
use crate::config::QueryConfig;

/// Message shown to clients when a query fails after retries.
const FETCH_ERROR_MESSAGE: &str = "Failed to load bills";

/// Tunables for a feed instance.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Quiet period before a search edit commits.
    pub debounce: Duration,
    /// Page size the feed starts with.
    pub page_size: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(600),
            page_size: 10,
        }
    }
}

impl From<&QueryConfig> for FeedSettings {
    fn from(config: &QueryConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            page_size: config.page_size,
        }
    }
}

/// A state change requested by a feed client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FeedInput {
    /// Replace the search text. Buffered until typing pauses.
    SetSearch(String),
    /// Jump to a zero-based page. Applied immediately.
    SetPage(u32),
    /// Change the page size. Applied immediately; zero is ignored.
    SetPageSize(u32),
}

/// Point-in-time view of a feed's query state and results.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuerySnapshot {
    pub results: Vec<Bill>,
    pub total_count: u64,
    /// True while a query for the current inputs is outstanding.
    pub loading: bool,
    /// User-facing message when the last query failed.
    pub error: Option<String>,
    pub page: u32,
    pub page_size: u32,
    /// Committed search text (pending keystrokes are not reflected here).
    pub search: String,
}

/// Client half of a spawned feed.
///
/// Dropping the handle stops the feed task.
pub struct FeedHandle {
    input: mpsc::UnboundedSender<FeedInput>,
    snapshots: watch::Receiver<QuerySnapshot>,
}

impl FeedHandle {
    /// Submit an input. Returns false if the feed task has stopped.
    pub fn apply(&self, input: FeedInput) -> bool {
        self.input.send(input).is_ok()
    }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<QuerySnapshot> {
        self.snapshots.clone()
    }
}

/// Start a feed task and issue its initial query.
#[must_use]
pub fn spawn_feed(engine: Arc<QueryEngine>, settings: FeedSettings) -> FeedHandle {
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshots) = watch::channel(QuerySnapshot {
        results: Vec::new(),
        total_count: 0,
        loading: true,
        error: None,
        page: 0,
        page_size: settings.page_size,
        search: String::new(),
    });

    let task = FeedTask {
        engine,
        snapshots: Arc::new(snapshot_tx),
        generation: Arc::new(AtomicU64::new(0)),
        page: 0,
        page_size: settings.page_size,
        search: String::new(),
        pending_search: None,
    };
    tokio::spawn(task.run(input_rx, settings.debounce));

    FeedHandle {
        input: input_tx,
        snapshots,
    }
}

struct FeedTask {
    engine: Arc<QueryEngine>,
    snapshots: Arc<watch::Sender<QuerySnapshot>>,
    /// Generation of the most recently issued query.
    generation: Arc<AtomicU64>,
    page: u32,
    page_size: u32,
    /// Committed search text.
    search: String,
    /// Search edit waiting out the quiet period.
    pending_search: Option<String>,
}

impl FeedTask {
    async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<FeedInput>, debounce: Duration) {
        self.issue_query();

        let timer = sleep(debounce);
        tokio::pin!(timer);
        let mut armed = false;

        loop {
            tokio::select! {
                maybe_input = inputs.recv() => {
                    let Some(input) = maybe_input else { break };
                    match input {
                        FeedInput::SetSearch(text) => {
                            let current = self.pending_search.as_ref().unwrap_or(&self.search);
                            if &text == current {
                                continue;
                            }
                            self.pending_search = Some(text);
                            timer.as_mut().reset(Instant::now() + debounce);
                            armed = true;
                        }
                        FeedInput::SetPage(page) => {
                            if page == self.page {
                                continue;
                            }
                            self.page = page;
                            self.issue_query();
                        }
                        FeedInput::SetPageSize(size) => {
                            if size == 0 {
                                warn!("ignoring zero page size input");
                                continue;
                            }
                            if size == self.page_size {
                                continue;
                            }
                            self.page_size = size;
                            self.issue_query();
                        }
                    }
                }
                () = &mut timer, if armed => {
                    armed = false;
                    if let Some(text) = self.pending_search.take() {
                        if text != self.search {
                            self.search = text;
                            self.issue_query();
                        }
                    }
                }
            }
        }
    }

    /// Issue a query for the current committed inputs.
    ///
    /// The snapshot flips to loading immediately, keeping the previous
    /// results visible. The fetch itself runs on its own task so input
    /// handling is never blocked; it publishes only if no newer query
    /// has been issued by the time it resolves.
    fn issue_query(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.snapshots.send_modify(|snapshot| {
            snapshot.loading = true;
            snapshot.error = None;
            snapshot.page = self.page;
            snapshot.page_size = self.page_size;
            snapshot.search = self.search.clone();
        });

        let query = BillQuery {
            page: self.page,
            page_size: self.page_size,
            search: self.search.clone(),
        };
        let engine = Arc::clone(&self.engine);
        let latest = Arc::clone(&self.generation);
        let snapshots = Arc::clone(&self.snapshots);

        tokio::spawn(async move {
            let outcome = engine.run(&query).await;

            // The sender runs closures serially, so checking the generation
            // inside keeps check and publish atomic across workers.
            let published = snapshots.send_if_modified(|snapshot| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                snapshot.loading = false;
                match outcome {
                    Ok(page) => {
                        snapshot.results = page.results;
                        snapshot.total_count = page.total_count;
                        snapshot.error = None;
                    }
                    Err(err) => {
                        warn!(error = %err, "bill query failed");
                        snapshot.results = Vec::new();
                        snapshot.total_count = 0;
                        snapshot.error = Some(FETCH_ERROR_MESSAGE.to_string());
                    }
                }
                true
            });

            if !published {
                debug!(generation, "discarding superseded query result");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::cache::QueryCache;
    use crate::bills::query::QuerySettings;
    use crate::oireachtas::mock::MockOireachtasClient;

    #[test]
    fn inputs_use_camel_case_tags() {
        let set_search: FeedInput = serde_json::from_str(r#"{"setSearch":"finance"}"#).unwrap();
        assert_eq!(set_search, FeedInput::SetSearch("finance".into()));

        let set_page: FeedInput = serde_json::from_str(r#"{"setPage":2}"#).unwrap();
        assert_eq!(set_page, FeedInput::SetPage(2));

        let set_page_size: FeedInput = serde_json::from_str(r#"{"setPageSize":25}"#).unwrap();
        assert_eq!(set_page_size, FeedInput::SetPageSize(25));
    }

    #[test]
    fn snapshot_serializes_with_camel_case_fields() {
        let snapshot = QuerySnapshot {
            results: Vec::new(),
            total_count: 15,
            loading: false,
            error: None,
            page: 1,
            page_size: 10,
            search: "finance".into(),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totalCount"], 15);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["loading"], false);
        assert!(json["error"].is_null());
        assert_eq!(json["search"], "finance");
    }

    async fn wait_for_idle(snapshots: &mut watch::Receiver<QuerySnapshot>) {
        while snapshots.borrow().loading {
            snapshots.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_burst_issues_one_query() {
        let client = Arc::new(MockOireachtasClient::new());
        let engine = Arc::new(QueryEngine::new(
            client.clone(),
            QueryCache::new(8, Duration::from_secs(600)),
            QuerySettings::default(),
        ));
        let handle = spawn_feed(engine, FeedSettings::default());
        let mut snapshots = handle.snapshots();

        wait_for_idle(&mut snapshots).await;
        assert_eq!(client.fetch_calls().len(), 1, "initial query only");

        for text in ["T", "Te", "Test"] {
            assert!(handle.apply(FeedInput::SetSearch(text.into())));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        // Ride out the quiet period and the resulting fetch.
        tokio::time::sleep(Duration::from_secs(2)).await;
        wait_for_idle(&mut snapshots).await;

        let calls = client.fetch_calls();
        assert_eq!(calls.len(), 2, "burst collapsed into one search query");
        assert_eq!(calls[1], (200, 0), "search fetches the wide window");
        assert_eq!(snapshots.borrow().search, "Test");
    }
}
