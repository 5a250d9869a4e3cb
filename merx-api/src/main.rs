use merx_api::{app, AppState};
use merx_order::gateway::MockConfirmationGateway;
use merx_order::OrderOrchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merx_api=debug,merx_order=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = merx_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Merx API on port {}", config.server.port);

    let db = merx_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let cache = Arc::new(
        merx_store::RedisCacheCoordinator::new(&config.redis.url)
            .expect("Failed to create Redis client"),
    );

    let events = Arc::new(
        merx_store::EventProducer::new(&config.kafka.brokers)
            .expect("Failed to create Kafka producer"),
    );

    let products = Arc::new(merx_store::PgProductCatalog::new(db.pool.clone()));
    let inventory = Arc::new(merx_store::PgInventoryLedger::new(db.pool.clone()));
    let region_pricing = Arc::new(merx_store::PgRegionPricing::new(db.pool.clone()));
    let orders = Arc::new(merx_store::PgOrderRepository::new(db.pool.clone()));

    let confirmations: Arc<dyn merx_core::confirmation::ConfirmationGateway> =
        if config.confirmation.base_url.is_empty() {
            tracing::warn!("No confirmation authority configured; using the mock gateway");
            Arc::new(MockConfirmationGateway::new())
        } else {
            Arc::new(
                merx_store::HttpConfirmationGateway::new(&config.confirmation)
                    .expect("Failed to build confirmation client"),
            )
        };

    let orchestrator = Arc::new(OrderOrchestrator::new(
        products.clone(),
        inventory,
        region_pricing.clone(),
        orders.clone(),
        confirmations,
        cache.clone(),
    ));

    let state = AppState {
        orchestrator,
        orders,
        products,
        region_pricing,
        cache,
        events,
        currencies: Arc::new(config.region_currency_map()),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app(state)).await.unwrap();
}
