//! Common test utilities for integration tests.
//!
//! This module provides:
//!
//! - [`app_builder::TestAppBuilder`] - Build test Axum apps that mirror main.rs wiring
//! - Payload builders for raw legislation API responses
//!
//! # App Builder Usage
//!
//! ```ignore
//! use crate::common::app_builder::TestAppBuilder;
//!
//! #[tokio::test]
//! async fn test_with_app() {
//!     let mock = Arc::new(MockOireachtasClient::new());
//!     let app = TestAppBuilder::new().with_client(mock.clone()).build();
//!     // Use app.oneshot(...) to send requests
//! }
//! ```

pub mod app_builder;

use oireachtas_bills_api::oireachtas::{
    BillApiResponse, BillData, BillResult, ResponseHead, ResultCounts, Sponsor, SponsorEntry,
    SponsorName,
};

/// Build a raw API response with the given dataset total.
pub fn api_page(bill_count: u64, bills: Vec<BillData>) -> BillApiResponse {
    BillApiResponse {
        head: ResponseHead {
            counts: ResultCounts {
                bill_count,
                result_count: bills.len() as u64,
            },
        },
        results: bills.into_iter().map(|bill| BillResult { bill }).collect(),
    }
}

/// Build a raw bill record with an optional single sponsor.
pub fn bill_data(bill_no: &str, bill_type: &str, sponsor: Option<&str>) -> BillData {
    BillData {
        bill_no: bill_no.to_string(),
        bill_type: bill_type.to_string(),
        status: "Current".to_string(),
        sponsors: sponsor.map(|name| vec![sponsor_entry(name)]).unwrap_or_default(),
        short_title_en: Some(format!("Bill {bill_no}")),
        short_title_ga: Some(format!("Bille {bill_no}")),
    }
}

/// Build a sponsor entry whose display form shows the given name.
pub fn sponsor_entry(name: &str) -> SponsorEntry {
    SponsorEntry {
        sponsor: Sponsor {
            as_shown: Some(SponsorName {
                show_as: Some(name.to_string()),
                uri: None,
            }),
            by: None,
            is_primary: true,
        },
    }
}

/// Build `count` plain public bills numbered from 1.
pub fn numbered_bills(count: usize) -> Vec<BillData> {
    (1..=count)
        .map(|n| bill_data(&n.to_string(), "Public", None))
        .collect()
}
