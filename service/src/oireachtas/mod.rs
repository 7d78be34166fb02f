//! Oireachtas API client module.
//!
//! Provides HTTP client abstraction for fetching Irish legislation data
//! from the Oireachtas open data service.
//!
//! # Architecture
//!
//! The module uses a trait-based design for testability:
//!
//! - [`OireachtasApiClient`] - Trait defining API operations
//! - [`HttpOireachtasClient`] - Real HTTP implementation using reqwest
//! - [`mock::MockOireachtasClient`] - Mock for unit tests (behind `test-utils` feature)
//!
//! # Testing Patterns
//!
//! ## Unit Tests (Mock Implementation)
//!
//! Use `MockOireachtasClient` for fast, isolated unit tests:
//!
//! ```ignore
//! use oireachtas_bills_api::oireachtas::mock::MockOireachtasClient;
//!
//! let mock = MockOireachtasClient::new();
//! mock.push_fetch_result(Ok(BillApiResponse { ... }));
//!
//! // Pass mock to code under test
//! let page = engine.run(&query).await?;
//! assert_eq!(mock.fetch_calls(), vec![(10, 0)]);
//! ```
//!
//! ## Integration Tests (HTTP Stubbing)
//!
//! Use `wiremock` to test `HttpOireachtasClient` against stubbed HTTP:
//!
//! ```ignore
//! use oireachtas_bills_api::oireachtas::HttpOireachtasClient;
//! use wiremock::matchers::{method, path, query_param};
//! use wiremock::{Mock, MockServer, ResponseTemplate};
//!
//! let server = MockServer::start().await;
//!
//! Mock::given(method("GET"))
//!     .and(path("/legislation"))
//!     .and(query_param("limit", "10"))
//!     .respond_with(ResponseTemplate::new(200).set_body_json(json!({
//!         "head": { "counts": { "billCount": 1, "resultCount": 1 } },
//!         "results": [ { "bill": { "billNo": "45", ... } } ]
//!     })))
//!     .mount(&server)
//!     .await;
//!
//! let client = HttpOireachtasClient::new(server.uri());
//! let page = client.fetch_legislation(10, 0).await.unwrap();
//! assert_eq!(page.head.counts.bill_count, 1);
//! ```

mod client;
mod types;

pub use client::{HttpOireachtasClient, OireachtasApiClient, OireachtasApiError};
pub use types::{
    BillApiResponse, BillData, BillResult, ResponseHead, ResultCounts, Sponsor, SponsorEntry,
    SponsorName,
};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;
