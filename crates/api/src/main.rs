use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use beacon_core::pending_signup::PendingSignups;
use beacon_core::sos::{NotificationDispatcher, PlaceLookup, SosWorkflow};
use beacon_db::sos::{PgResponderDirectory, PgSosLogStore};
use beacon_delivery::{DisabledDispatcher, EmailConfig, OtpMailer, TwilioConfig, WhatsAppDispatcher};
use beacon_places::{GooglePlacesClient, PlacesConfig, UnconfiguredPlaceLookup};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beacon_api::background::expiry_sweeper;
use beacon_api::config::ServerConfig;
use beacon_api::router::build_app_router;
use beacon_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = beacon_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    beacon_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    beacon_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Uploads ---
    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .expect("Failed to create uploads directory");

    // --- Messaging channel ---
    let call_timeout = config.sos.external_call_timeout();
    let dispatcher: Arc<dyn NotificationDispatcher> = match TwilioConfig::from_env() {
        Some(twilio) => Arc::new(
            WhatsAppDispatcher::new(twilio.with_timeout(call_timeout))
                .expect("Failed to build WhatsApp client"),
        ),
        None => {
            tracing::warn!("Twilio not configured, SOS alerts will not be delivered");
            Arc::new(DisabledDispatcher)
        }
    };
    if let Some(to) = &config.sos.override_recipient {
        tracing::warn!(to = %to, "WHATSAPP_OVERRIDE_TO set, all alerts go to the sandbox recipient");
    }

    // --- Place lookup ---
    let places: Arc<dyn PlaceLookup> = match PlacesConfig::from_env() {
        Some(places) => Arc::new(
            GooglePlacesClient::new(places.with_timeout(call_timeout))
                .expect("Failed to build Places client"),
        ),
        None => {
            tracing::warn!("GOOGLE_MAPS_API_KEY not set, self-help and other-help SOS will fail");
            Arc::new(UnconfiguredPlaceLookup)
        }
    };

    // --- Email ---
    let mailer = EmailConfig::from_env().map(|c| Arc::new(OtpMailer::new(c)));
    if mailer.is_none() {
        tracing::warn!("SMTP_HOST not set, OTP emails will not be sent");
    }

    // --- SOS workflow ---
    let sos = Arc::new(SosWorkflow::new(
        Arc::new(PgResponderDirectory::new(pool.clone())),
        places,
        Arc::clone(&dispatcher),
        Arc::new(PgSosLogStore::new(pool.clone())),
        config.sos.workflow_config(),
    ));

    // --- Pending signups and expiry sweep ---
    let pending_signups = Arc::new(PendingSignups::new(config.otp_ttl()));
    let sweeper_cancel = CancellationToken::new();
    let sweeper_handle = tokio::spawn(expiry_sweeper::run(
        Arc::clone(&pending_signups),
        pool.clone(),
        expiry_sweeper::SWEEP_INTERVAL,
        sweeper_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        sos,
        dispatcher,
        mailer,
        pending_signups,
    };

    let app = build_app_router(state, &config);

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

    sweeper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweeper_handle).await;
    tracing::info!("Expiry sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
