use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tubefeed_api::{query::QueryService, router, AppState};
use tubefeed_common::AppConfig;
use tubefeed_ingest::{KeyRotator, PaginationCursor, Poller, Scheduler};
use tubefeed_store::VideoStore;
use youtube_client::YouTubeClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("tubefeed=info".parse()?)
                .add_directive("tubefeed_api=info".parse()?)
                .add_directive("tubefeed_ingest=info".parse()?)
                .add_directive("tubefeed_store=info".parse()?)
                .add_directive("youtube_client=info".parse()?),
        )
        .init();

    info!("tubefeed starting...");

    let config = AppConfig::from_env()?;

    // No store, no service: connection or migration failure aborts startup.
    let store = VideoStore::connect(&config.database_url).await?;
    store.migrate().await?;
    info!("Connected to Postgres, migrations applied");

    // Ingestion
    let client = YouTubeClient::new(config.request_timeout)?;
    let poller = Poller::new(
        Arc::new(client),
        Arc::new(store.clone()),
        config.search_query.clone(),
        KeyRotator::new(config.youtube_api_keys.clone())?,
        PaginationCursor::new(config.published_after),
    );
    let scheduler = Scheduler::new(config.poll_interval).spawn(poller);

    // Query API
    let state = Arc::new(AppState {
        query: QueryService::new(Arc::new(store)),
    });
    let app = router(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("tubefeed API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    let poller = scheduler.stop().await?;
    info!(
        key_index = poller.keys().index(),
        key_pool = poller.keys().len(),
        "Ingestion stopped. {}",
        poller.stats()
    );
    Ok(())
}
