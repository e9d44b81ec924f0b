use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use civic_service::app_state::AppState;
use civic_service::config::Config;
use civic_service::handlers;
use civic_service::repository::{MemoryStore, PgStore, Store};
use civic_service::seed;
use civic_service::workers::{start_sla_monitor, SlaMonitorConfig};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!("Starting civic-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Pick the storage backend
    let store: Arc<dyn Store> = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await
                .expect("Failed to create database pool");
            tracing::info!(
                max_connections = config.database.max_connections,
                "Database pool created"
            );

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations completed");

            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::build(store, &config);

    if config.app.seed_demo_data && !config.is_production() {
        seed::seed_demo_data(state.store.as_ref(), &state.rewards)
            .await
            .expect("Failed to seed demo data");
    }

    // Background SLA breach scan
    tokio::spawn(start_sla_monitor(
        state.reports.clone(),
        SlaMonitorConfig {
            enabled: true,
            scan_interval: Duration::from_secs(config.sla.scan_interval_secs),
        },
    ));

    let bind_addr = (config.app.host.clone(), config.app.http_port);
    tracing::info!(
        host = %config.app.host,
        port = config.app.http_port,
        "HTTP server listening"
    );

    let state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
