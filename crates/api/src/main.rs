use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meridian_api::config::ServerConfig;
use meridian_api::engine::executor::ActionRegistry;
use meridian_api::router::build_app_router;
use meridian_api::state::AppState;
use meridian_messaging::{MemoryMessenger, Messenger, SmtpConfig, SmtpMessenger, WebhookMessenger};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meridian_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = meridian_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    meridian_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    meridian_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Messaging collaborator ---
    // SMTP when configured, then an external gateway, then a log-only
    // recorder so local development works with no transport at all.
    let messenger: Arc<dyn Messenger> = if let Some(smtp) = SmtpConfig::from_env() {
        tracing::info!(host = %smtp.smtp_host, "Using SMTP messenger");
        Arc::new(SmtpMessenger::new(smtp))
    } else if let Some(gateway) = WebhookMessenger::from_env() {
        tracing::info!("Using gateway messenger");
        Arc::new(gateway)
    } else {
        tracing::warn!("No messaging transport configured; outbound messages are recorded only");
        Arc::new(MemoryMessenger::new())
    };

    // --- Action registry ---
    let registry = Arc::new(ActionRegistry::with_default_handlers());

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        messenger,
        registry,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
