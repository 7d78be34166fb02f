//! Data types for Oireachtas legislation API responses.
//!
//! The wire shape is fixed by the upstream API. Every field the transformer
//! does not strictly need is optional with a serde default, so a sparse or
//! partial payload deserializes instead of failing the whole request.

use serde::{Deserialize, Serialize};

/// Top-level response from the legislation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillApiResponse {
    #[serde(default)]
    pub head: ResponseHead,
    #[serde(default)]
    pub results: Vec<BillResult>,
}

/// Response header carrying result counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseHead {
    #[serde(default)]
    pub counts: ResultCounts,
}

/// Counts reported by the server.
///
/// `bill_count` is the total number of bills in the dataset, independent of
/// the requested page; `result_count` is the size of the returned slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCounts {
    #[serde(default)]
    pub bill_count: u64,
    #[serde(default)]
    pub result_count: u64,
}

/// One entry of the `results` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillResult {
    #[serde(default)]
    pub bill: BillData,
}

/// A single raw bill record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillData {
    /// Official bill number (e.g. "45"). Display string, not guaranteed numeric.
    #[serde(default)]
    pub bill_no: String,
    /// Category label (e.g. "Public").
    #[serde(default)]
    pub bill_type: String,
    /// Status from an open-ended vocabulary (Current, Enacted, Withdrawn, ...).
    #[serde(default)]
    pub status: String,
    /// Sponsor entries; absent for some bills.
    #[serde(default)]
    pub sponsors: Vec<SponsorEntry>,
    /// English short title.
    #[serde(default)]
    pub short_title_en: Option<String>,
    /// Irish short title.
    #[serde(default)]
    pub short_title_ga: Option<String>,
}

/// Wrapper object around a sponsor record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SponsorEntry {
    #[serde(default)]
    pub sponsor: Sponsor,
}

/// A sponsor of a bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    /// Display form of the sponsor. The upstream field is named `as`,
    /// which collides with the Rust keyword.
    #[serde(rename = "as", default)]
    pub as_shown: Option<SponsorName>,
    /// Sponsoring body, when the bill was brought on someone's behalf.
    #[serde(default)]
    pub by: Option<SponsorName>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Display name record attached to a sponsor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorName {
    #[serde(default)]
    pub show_as: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}
