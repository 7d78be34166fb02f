//! REST API handlers and `OpenAPI` documentation.
//!
//! This module provides the versioned HTTP surface over the bill domain:
//! one-shot bill queries, the favorites store, and the WebSocket feed for
//! clients that want debounced live updates. Domain types carry `ToSchema`
//! derives for `OpenAPI` spec generation.

// The OpenApi derive macro generates code that triggers this lint
#![allow(clippy::needless_for_each)]

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Extension, FromRequestParts, Path, Query, WebSocketUpgrade,
    },
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize, Serializer};
use tokio::sync::watch;
use tracing::{debug, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::bills::{
    spawn_feed, Bill, BillQuery, FavoriteRecord, FavoritesStore, FeedInput, FeedSettings,
    QueryEngine, QueryError, QuerySnapshot,
};

/// Largest page a single request may ask for.
const MAX_PAGE_SIZE: u32 = 100;

/// Serialize a `StatusCode` as its `u16` representation.
#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires `&T` signature
fn serialize_status_code<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

/// RFC 7807 Problem Details error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// URI reference identifying the problem type
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short human-readable summary
    pub title: String,
    /// HTTP status code
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub status: StatusCode,
    /// Human-readable explanation specific to this occurrence
    pub detail: String,
    /// URI reference identifying the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ProblemExtensions>,
}

/// Extended error information.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemExtensions {
    /// Stable machine-readable error code
    pub code: String,
    /// Field that caused the error (for validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ProblemDetails {
    /// Create a validation error response.
    #[must_use]
    pub fn validation_error(detail: &str, field: Option<&str>) -> Self {
        Self {
            problem_type: "https://oireachtasbills.dev/errors/validation".to_string(),
            title: "Validation Failed".to_string(),
            status: StatusCode::BAD_REQUEST,
            detail: detail.to_string(),
            instance: None,
            extensions: Some(ProblemExtensions {
                code: "VALIDATION_ERROR".to_string(),
                field: field.map(ToString::to_string),
            }),
        }
    }

    /// Create an upstream failure response.
    #[must_use]
    pub fn upstream_error(detail: &str) -> Self {
        Self {
            problem_type: "https://oireachtasbills.dev/errors/upstream".to_string(),
            title: "Upstream Unavailable".to_string(),
            status: StatusCode::BAD_GATEWAY,
            detail: detail.to_string(),
            instance: None,
            extensions: Some(ProblemExtensions {
                code: "UPSTREAM_ERROR".to_string(),
                field: None,
            }),
        }
    }

    /// Create an internal server error response.
    #[must_use]
    pub fn internal_error(detail: &str) -> Self {
        Self {
            problem_type: "https://oireachtasbills.dev/errors/internal".to_string(),
            title: "Internal Server Error".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.to_string(),
            instance: None,
            extensions: Some(ProblemExtensions {
                code: "INTERNAL_ERROR".to_string(),
                field: None,
            }),
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<QueryError> for ProblemDetails {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidPageSize => {
                Self::validation_error("pageSize must be greater than zero", Some("pageSize"))
            }
            QueryError::Upstream(upstream) => {
                warn!(error = %upstream, "bill fetch failed");
                Self::upstream_error("Failed to load bills")
            }
        }
    }
}

/// [`Query`] wrapper that reports deserialization failures as
/// [`ProblemDetails`].
///
/// Axum's built-in rejection for an unparseable query string is a
/// plain-text response; parameter errors must carry the same problem
/// body as every other validation failure.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemDetails;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ProblemDetails::validation_error(&rejection.body_text(), None)),
        }
    }
}

/// Query parameters accepted by the bills listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BillsParams {
    /// Zero-based page index
    #[serde(default)]
    pub page: u32,
    /// Rows per page (1-100); omitted means the configured default
    pub page_size: Option<u32>,
    /// Free-text search over bill number, type and sponsor
    #[serde(default)]
    pub q: String,
}

/// Page size applied when a bills request does not send `pageSize`.
///
/// Carries `query.page_size` from the configuration, the same value the
/// feed starts sessions with.
#[derive(Debug, Clone, Copy)]
pub struct DefaultPageSize(pub u32);

/// One page of bills.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillsResponse {
    pub results: Vec<Bill>,
    /// Dataset total when paginating, match total when searching
    pub total_count: u64,
}

/// All favorited bills, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteRecord>,
    pub count: usize,
}

/// Favorite state after a toggle.
#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResponse {
    pub id: String,
    pub favorite: bool,
}

/// Favorite membership for one bill id.
#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipResponse {
    pub id: String,
    pub favorite: bool,
}

/// `OpenAPI` documentation for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Oireachtas Bills API",
        version = "1.0.0",
        description = "Query service for Irish legislative bills",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "REST API v1")
    ),
    paths(list_bills, list_favorites, toggle_favorite, favorite_membership),
    components(schemas(
        Bill,
        BillsResponse,
        FavoriteRecord,
        FavoritesResponse,
        ToggleResponse,
        MembershipResponse,
        FeedInput,
        QuerySnapshot,
        ProblemDetails,
        ProblemExtensions
    ))
)]
pub struct ApiDoc;

/// List bills
///
/// Returns one page of bills. Without `q` the upstream service pages the
/// full dataset; with `q` a wide window is fetched and filtered by
/// case-insensitive substring over bill number, type and sponsor.
///
/// # Errors
///
/// Returns `ProblemDetails` for invalid parameters or upstream failures.
#[utoipa::path(
    get,
    path = "/bills",
    tag = "Bills",
    params(BillsParams),
    responses(
        (status = 200, description = "One page of bills", body = BillsResponse),
        (status = 400, description = "Invalid query parameters", body = ProblemDetails),
        (status = 502, description = "Upstream fetch failed", body = ProblemDetails)
    )
)]
pub async fn list_bills(
    ValidatedQuery(params): ValidatedQuery<BillsParams>,
    Extension(engine): Extension<Arc<QueryEngine>>,
    Extension(DefaultPageSize(default_page_size)): Extension<DefaultPageSize>,
) -> Result<Json<BillsResponse>, ProblemDetails> {
    if let Some(size) = params.page_size {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ProblemDetails::validation_error(
                "pageSize must be between 1 and 100",
                Some("pageSize"),
            ));
        }
    }

    let query = BillQuery {
        page: params.page,
        page_size: params.page_size.unwrap_or(default_page_size),
        search: params.q,
    };
    let page = engine.run(&query).await?;

    Ok(Json(BillsResponse {
        results: page.results,
        total_count: page.total_count,
    }))
}

/// List favorites
///
/// Returns every favorited bill in the order it was added.
#[utoipa::path(
    get,
    path = "/favorites",
    tag = "Favorites",
    responses(
        (status = 200, description = "All favorites", body = FavoritesResponse)
    )
)]
pub async fn list_favorites(
    Extension(favorites): Extension<Arc<FavoritesStore>>,
) -> Json<FavoritesResponse> {
    let records = favorites.list().await;
    Json(FavoritesResponse {
        count: records.len(),
        favorites: records,
    })
}

/// Toggle a favorite
///
/// Adds the bill to the favorites when absent, removes it when present.
/// The response carries the state after the call.
#[utoipa::path(
    post,
    path = "/favorites/toggle",
    tag = "Favorites",
    request_body = Bill,
    responses(
        (status = 200, description = "Favorite state after the toggle", body = ToggleResponse)
    )
)]
pub async fn toggle_favorite(
    Extension(favorites): Extension<Arc<FavoritesStore>>,
    Json(bill): Json<Bill>,
) -> Json<ToggleResponse> {
    let id = bill.id.clone();
    let favorite = favorites.toggle(bill).await;
    Json(ToggleResponse { id, favorite })
}

/// Check favorite membership
///
/// Reports whether the given bill id is currently favorited.
#[utoipa::path(
    get,
    path = "/favorites/{id}",
    tag = "Favorites",
    params(
        ("id" = String, Path, description = "Synthetic bill id")
    ),
    responses(
        (status = 200, description = "Membership state", body = MembershipResponse)
    )
)]
pub async fn favorite_membership(
    Path(id): Path<String>,
    Extension(favorites): Extension<Arc<FavoritesStore>>,
) -> Json<MembershipResponse> {
    let favorite = favorites.is_favorite(&id).await;
    Json(MembershipResponse { id, favorite })
}

/// Health check handler.
#[allow(clippy::unused_async)] // Required for Axum handler signature
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Upgrade to the live bill feed.
///
/// The socket receives a [`QuerySnapshot`] JSON message for every state
/// change and accepts [`FeedInput`] JSON messages. Search edits are
/// debounced server-side; page changes apply immediately.
pub async fn bills_feed(
    ws: WebSocketUpgrade,
    Extension(engine): Extension<Arc<QueryEngine>>,
    Extension(settings): Extension<FeedSettings>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| feed_socket(socket, engine, settings))
}

async fn feed_socket(mut socket: WebSocket, engine: Arc<QueryEngine>, settings: FeedSettings) {
    let handle = spawn_feed(engine, settings);
    let mut snapshots = handle.snapshots();

    // Push the starting state so clients render without waiting for input.
    if send_snapshot(&mut socket, &snapshots).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                if send_snapshot(&mut socket, &snapshots).await.is_err() {
                    break;
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<FeedInput>(text.as_str()) {
                            Ok(input) => {
                                if !handle.apply(input) {
                                    break;
                                }
                            }
                            Err(err) => {
                                debug!(error = %err, "ignoring malformed feed input");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(error = %err, "feed socket error");
                        break;
                    }
                }
            }
        }
    }
}

async fn send_snapshot(
    socket: &mut WebSocket,
    snapshots: &watch::Receiver<QuerySnapshot>,
) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(&*snapshots.borrow()) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize feed snapshot");
            return Ok(());
        }
    };
    socket.send(Message::Text(payload.into())).await
}

/// Build the versioned API router.
///
/// The caller mounts this under `/api/v1` and adds cross-cutting layers.
pub fn router(
    engine: Arc<QueryEngine>,
    favorites: Arc<FavoritesStore>,
    feed_settings: FeedSettings,
    default_page_size: u32,
) -> Router {
    Router::new()
        .route("/bills", get(list_bills))
        .route("/bills/feed", get(bills_feed))
        .route("/favorites", get(list_favorites))
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/favorites/{id}", get(favorite_membership))
        .layer(Extension(engine))
        .layer(Extension(favorites))
        .layer(Extension(feed_settings))
        .layer(Extension(DefaultPageSize(default_page_size)))
}
