#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use oireachtas_bills_api::{
    bills::{FavoritesStore, FeedSettings, LogNotifier, QueryCache, QueryEngine, QuerySettings},
    config::Config,
    oireachtas::HttpOireachtasClient,
    rest::{self, ApiDoc},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Bill query service over the Oireachtas open data API.
#[derive(Debug, Parser)]
#[command(name = "oireachtas-bills-api", version)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    // Load and validate configuration first (fail-fast)
    let config = Config::load_from(&args.config).map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up logging from config
    std::env::set_var("RUST_LOG", &config.logging.level);
    tracing_subscriber::fmt::init();

    // Init banner so container logs clearly show startup
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "oireachtas-bills-api starting up"
    );

    // Upstream client and query pipeline
    let client = Arc::new(HttpOireachtasClient::from_config(&config.oireachtas)?);
    tracing::info!(base_url = %config.oireachtas.base_url, "Oireachtas API client configured");

    let cache = QueryCache::new(
        config.query.cache_capacity,
        Duration::from_secs(config.query.cache_ttl_secs),
    );
    let engine = Arc::new(QueryEngine::new(
        client,
        cache,
        QuerySettings::from(&config.query),
    ));
    let favorites = Arc::new(FavoritesStore::new(Arc::new(LogNotifier)));
    let feed_settings = FeedSettings::from(&config.query);

    // Build CORS layer from config
    let cors_origins = &config.cors.allowed_origins;
    let allow_origin: AllowOrigin = if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow any origin - not recommended for production");
        AllowOrigin::any()
    } else if cors_origins.is_empty() {
        tracing::info!(
            "CORS allowed origins not configured - cross-origin requests will be blocked"
        );
        AllowOrigin::list(Vec::<HeaderValue>::new())
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        tracing::info!(origins = ?cors_origins, "CORS allowed origins configured");
        AllowOrigin::list(origins)
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    // Build the API
    let mut app = Router::new()
        .nest(
            "/api/v1",
            rest::router(engine, favorites, feed_settings, config.query.page_size),
        )
        // Health check route
        .route("/health", get(rest::health_check))
        // Prometheus scrape endpoint
        .route("/metrics", get(move || async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(allow_origin),
        );

    if config.swagger.enabled {
        tracing::info!("Swagger UI enabled at /swagger-ui");
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address: {e}"))?;
    tracing::info!("Starting server at http://{}/api/v1", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::warn!(error = %err, "failed to install shutdown handler");
            std::future::pending::<()>().await;
        }
    }
}
