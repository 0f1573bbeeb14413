use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use warp::Filter;

use nexus_orchestrator::ai::breaker::CircuitState;
use nexus_orchestrator::ai::embeddings::EmbeddingClient;
use nexus_orchestrator::ai::manager::AiManager;
use nexus_orchestrator::ai::rag::Retriever;
use nexus_orchestrator::{api, cache, config, db, error, middleware};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting NEXUS IDP generation service");

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    // Initialize database pool
    let db_pool = db::create_pool(&config.database_url).await?;
    info!("Database connection pool created");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    info!("Database migrations applied");

    // Composition root: one HTTP client, one provider pool, one retriever.
    // The breakers inside the pool are process-wide singletons by virtue of
    // this being the only construction site.
    let http_client = reqwest::Client::new();
    let ai = Arc::new(AiManager::from_config(&config, http_client.clone()));
    let embeddings = EmbeddingClient::from_config(&config, http_client);
    let retriever = Arc::new(Retriever::new(
        embeddings,
        db_pool.clone(),
        config.rag_match_count,
        config.rag_match_threshold,
    ));
    let idp_cache = Arc::new(cache::MemoryCache::new(Duration::from_millis(
        config.idp_cache_ttl_ms,
    )));

    let state = Arc::new(api::AppState {
        db_pool,
        ai: ai.clone(),
        retriever,
        idp_cache,
    });

    // Build API routes
    let api_routes = api::routes(state, config.api_token.clone())
        .with(warp::log("api"))
        .with(middleware::cors());

    // Health check route: service status plus per-provider circuit state
    let health_ai = ai.clone();
    let health = warp::path("health").and(warp::get()).map(move || {
        let providers = health_ai.health();
        let status = if providers
            .iter()
            .all(|p| p.circuit == CircuitState::Closed)
        {
            "healthy"
        } else {
            "degraded"
        };
        warp::reply::json(&serde_json::json!({
            "status": status,
            "providers": providers,
        }))
    });

    // Metrics route
    let metrics = warp::path("metrics").and(warp::get()).map(|| {
        use prometheus::{Encoder, TextEncoder};
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer).unwrap();
        warp::reply::with_header(buffer, "Content-Type", encoder.format_type())
    });

    let routes = health
        .or(metrics)
        .or(api_routes)
        .recover(error::handle_rejection);

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
