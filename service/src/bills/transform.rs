//! Flattening of raw API payloads into the domain [`Bill`] shape.
//!
//! The upstream payload nests each bill two levels deep and splits sponsor
//! names across optional wrapper objects. The transformer collapses all of
//! that into a flat record the rest of the service (and its clients) can
//! consume directly.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::oireachtas::BillApiResponse;

/// A bill as served by this API.
///
/// Field names follow the established client contract, including the
/// snake_case `title_en` / `title_ga` exceptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Synthetic identifier, `{billNo}-{position}` within one fetched page.
    ///
    /// The upstream API has no bill identifier, so this is only stable
    /// within the page it came from. Two fetches of different pages can
    /// assign the same id to different bills.
    pub id: String,
    pub bill_no: String,
    pub bill_type: String,
    pub bill_status: String,
    /// Comma-joined sponsor display names, or `Unknown` when none resolve.
    pub sponsor: String,
    #[serde(rename = "title_en")]
    pub title_en: String,
    #[serde(rename = "title_ga")]
    pub title_ga: String,
}

/// Flatten an API response into domain bills, preserving order.
///
/// Sponsor names are drawn from each entry's display form; entries without
/// one, and blank names, are dropped. When nothing survives the filter the
/// sponsor field reads `Unknown`.
#[must_use]
pub fn transform_bills(response: &BillApiResponse) -> Vec<Bill> {
    response
        .results
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let names: Vec<&str> = item
                .bill
                .sponsors
                .iter()
                .filter_map(|entry| entry.sponsor.as_shown.as_ref())
                .filter_map(|name| name.show_as.as_deref())
                .filter(|name| !name.is_empty())
                .collect();

            let sponsor = if names.is_empty() {
                String::from("Unknown")
            } else {
                names.join(", ")
            };

            Bill {
                id: format!("{}-{index}", item.bill.bill_no),
                bill_no: item.bill.bill_no.clone(),
                bill_type: item.bill.bill_type.clone(),
                bill_status: item.bill.status.clone(),
                sponsor,
                title_en: item.bill.short_title_en.clone().unwrap_or_default(),
                title_ga: item.bill.short_title_ga.clone().unwrap_or_default(),
            }
        })
        .collect()
}
