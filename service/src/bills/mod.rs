//! Bill domain: transformation, query execution, caching, favorites and
//! the live feed.
//!
//! # Architecture
//!
//! Data flows in one direction:
//!
//! 1. [`transform_bills`] flattens raw upstream payloads into [`Bill`] records.
//! 2. [`QueryEngine`] resolves a [`BillQuery`] to a [`BillPage`], choosing
//!    between server-side pagination and windowed client-side search, with
//!    retry and a TTL [`QueryCache`] in front of the network.
//! 3. [`spawn_feed`] wraps the engine in a long-lived task that debounces
//!    search input and discards superseded responses, publishing
//!    [`QuerySnapshot`]s over a watch channel.
//!
//! [`FavoritesStore`] sits beside the query path: favorites reference bills
//! by their synthetic id and never trigger fetches.

mod cache;
mod favorites;
mod feed;
mod query;
mod transform;

pub use cache::{QueryCache, QueryKey};
pub use favorites::{FavoriteNotifier, FavoriteRecord, FavoritesStore, LogNotifier};
pub use feed::{spawn_feed, FeedHandle, FeedInput, FeedSettings, QuerySnapshot};
pub use query::{BillPage, BillQuery, QueryEngine, QueryError, QuerySettings};
pub use transform::{transform_bills, Bill};
