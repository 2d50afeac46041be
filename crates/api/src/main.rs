use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use formkit_api::config::ServerConfig;
use formkit_api::router::build_app_router;
use formkit_api::state::AppState;
use formkit_core::roles::Role;
use formkit_core::store::{AccessControl, FormStore};
use formkit_db::{MemoryFormStore, PgFormStore};
use formkit_events::{ChannelNotifier, EmailConfig, EmailDelivery, EventBus, WebhookDelivery};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formkit_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        autosave_idle_ms = config.autosave.idle_delay.as_millis() as u64,
        "Loaded server configuration"
    );

    // --- Storage ---
    let (store, access, pool) = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = formkit_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            formkit_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            formkit_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let pg = Arc::new(PgFormStore::new(pool.clone()));
            let store: Arc<dyn FormStore> = pg.clone();
            let access: Arc<dyn AccessControl> = pg;
            (store, access, Some(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, running on the in-memory store");
            let memory = Arc::new(MemoryFormStore::new());
            if let Some(user_id) = std::env::var("DEV_OWNER_USER_ID")
                .ok()
                .and_then(|v| v.parse().ok())
            {
                memory.add_member(1, user_id, Role::Owner).await;
                tracing::info!(user_id, organization_id = 1, "Seeded development owner");
            }
            let store: Arc<dyn FormStore> = memory.clone();
            let access: Arc<dyn AccessControl> = memory;
            (store, access, None)
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // --- Notification delivery ---
    let email = match EmailConfig::from_env() {
        Some(cfg) => match EmailDelivery::new(cfg) {
            Ok(delivery) => Some(delivery),
            Err(e) => {
                tracing::warn!(error = %e, "SMTP configuration rejected, email delivery disabled");
                None
            }
        },
        None => {
            tracing::info!("SMTP_HOST not set, email delivery disabled");
            None
        }
    };
    let notifier = Arc::new(ChannelNotifier::new(
        email,
        WebhookDelivery::new(),
        Arc::clone(&event_bus),
    ));

    // --- App state ---
    let state = AppState::new(
        store,
        access,
        notifier,
        pool,
        config.clone(),
        Arc::clone(&event_bus),
    );
    let sessions = Arc::clone(&state.sessions);
    let pipeline = Arc::clone(&state.pipeline);

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let open_sessions = sessions.len().await;
    let _ = tokio::time::timeout(Duration::from_secs(5), sessions.close_all()).await;
    tracing::info!(open_sessions, "Designer sessions closed");

    let drained = pipeline
        .drain(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    tracing::info!(drained, "Automation tasks drained");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
