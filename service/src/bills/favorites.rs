//! In-memory favorites store with a pluggable add notifier.
//!
//! Favorites are identified by the synthetic bill id from
//! [`super::transform::Bill`]. That id is only stable within the page it was
//! fetched from, so the same underlying bill reached through a different
//! page can carry a different id. Acceptable for a session-scoped store;
//! a server-assigned identifier would be needed for durable persistence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use utoipa::ToSchema;

use super::transform::Bill;

/// A favorited bill and when it was added.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub bill: Bill,
    pub added_at: DateTime<Utc>,
}

/// Hook invoked after a bill becomes a favorite.
///
/// Removal is silent; only additions are announced.
#[async_trait]
pub trait FavoriteNotifier: Send + Sync {
    async fn favorite_added(&self, bill: &Bill);
}

/// Notifier that records the addition in the service log.
///
/// Stand-in for the eventual write to a backing persistence service.
pub struct LogNotifier;

#[async_trait]
impl FavoriteNotifier for LogNotifier {
    async fn favorite_added(&self, bill: &Bill) {
        info!(bill_id = %bill.id, bill_no = %bill.bill_no, "add favorite to server");
    }
}

/// Session-scoped favorites, listed in insertion order.
pub struct FavoritesStore {
    entries: Mutex<Vec<FavoriteRecord>>,
    notifier: Arc<dyn FavoriteNotifier>,
}

impl FavoritesStore {
    pub fn new(notifier: Arc<dyn FavoriteNotifier>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            notifier,
        }
    }

    /// Flip the favorite state of a bill.
    ///
    /// Returns the state after the call: `true` when the bill was added,
    /// `false` when it was removed. The notifier fires on additions only,
    /// after the store has been updated.
    pub async fn toggle(&self, bill: Bill) -> bool {
        let added = {
            let mut entries = self.entries.lock().await;
            match entries.iter().position(|record| record.bill.id == bill.id) {
                Some(index) => {
                    entries.remove(index);
                    false
                }
                None => {
                    entries.push(FavoriteRecord {
                        bill: bill.clone(),
                        added_at: Utc::now(),
                    });
                    true
                }
            }
        };

        // Notify outside the lock.
        if added {
            self.notifier.favorite_added(&bill).await;
        }
        added
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        self.entries
            .lock()
            .await
            .iter()
            .any(|record| record.bill.id == id)
    }

    /// Snapshot of all favorites, oldest first.
    pub async fn list(&self) -> Vec<FavoriteRecord> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
