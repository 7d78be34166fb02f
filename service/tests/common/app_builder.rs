//! Test app builder that mirrors main.rs wiring with injectable mock clients.
//!
//! This module provides a [`TestAppBuilder`] that constructs an Axum router
//! matching the production configuration in `main.rs`, but with the ability
//! to inject a mock upstream client and test-specific settings.
//!
//! # Usage
//!
//! ```ignore
//! use crate::common::app_builder::TestAppBuilder;
//!
//! #[tokio::test]
//! async fn test_with_mock_upstream() {
//!     let mock = Arc::new(MockOireachtasClient::new());
//!     mock.push_fetch_result(Ok(api_page(100, numbered_bills(10))));
//!
//!     let app = TestAppBuilder::new()
//!         .with_client(mock.clone())
//!         .with_cors(&["http://localhost:3000"])
//!         .build();
//!
//!     // Use app.oneshot(...) to send requests
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use oireachtas_bills_api::{
    bills::{FavoritesStore, FeedSettings, LogNotifier, QueryCache, QueryEngine, QuerySettings},
    oireachtas::{mock::MockOireachtasClient, OireachtasApiClient},
    rest,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Builder for test applications that mirrors main.rs wiring.
pub struct TestAppBuilder {
    client: Arc<dyn OireachtasApiClient>,
    query_settings: QuerySettings,
    feed_settings: FeedSettings,
    cache: QueryCache,
    default_page_size: u32,
    cors_origins: Option<Vec<String>>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    /// Create a builder with an empty mock upstream and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Arc::new(MockOireachtasClient::new()),
            query_settings: QuerySettings::default(),
            feed_settings: FeedSettings::default(),
            cache: QueryCache::new(8, Duration::from_secs(60)),
            default_page_size: 10,
            cors_origins: None,
        }
    }

    /// Replace the upstream client (usually a preloaded mock).
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn OireachtasApiClient>) -> Self {
        self.client = client;
        self
    }

    /// Override query execution settings.
    #[must_use]
    pub fn with_query_settings(mut self, settings: QuerySettings) -> Self {
        self.query_settings = settings;
        self
    }

    /// Override the page size applied when a request omits `pageSize`.
    #[must_use]
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Enable the CORS layer with the given allowed origins.
    #[must_use]
    pub fn with_cors(mut self, origins: &[&str]) -> Self {
        self.cors_origins = Some(origins.iter().map(ToString::to_string).collect());
        self
    }

    /// Build the router with the same composition as `main.rs`.
    #[must_use]
    pub fn build(self) -> Router {
        let engine = Arc::new(QueryEngine::new(
            self.client,
            self.cache,
            self.query_settings,
        ));
        let favorites = Arc::new(FavoritesStore::new(Arc::new(LogNotifier)));

        let mut app = Router::new()
            .nest(
                "/api/v1",
                rest::router(engine, favorites, self.feed_settings, self.default_page_size),
            )
            .route("/health", get(rest::health_check));

        if let Some(cors_origins) = self.cors_origins {
            // Mirrors the origin selection in main.rs.
            let allow_origin: AllowOrigin = if cors_origins.iter().any(|o| o == "*") {
                AllowOrigin::any()
            } else if cors_origins.is_empty() {
                AllowOrigin::list(Vec::<HeaderValue>::new())
            } else {
                let origins: Vec<HeaderValue> = cors_origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect();
                AllowOrigin::list(origins)
            };
            app = app.layer(
                CorsLayer::new()
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers(Any)
                    .allow_origin(allow_origin),
            );
        }

        app
    }
}
