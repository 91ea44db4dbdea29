//! Form Intake Service
//!
//! Accepts form submissions from block-editor front ends:
//! - Structural, per-field, pattern and type validation
//! - Type-aware sanitization
//! - Sliding-window throttling with shared-address detection
//! - Storage and administrator notification

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use validator::Validate;

use api::state::{start_store_cleanup, STORE_CLEANUP_INTERVAL};
use api::{router, ApiConfig, AppState, SubmissionHandler};
use delivery::{
    build_repository, NotificationConfig, NotificationDispatcher, SharedNotifier, StorageConfig,
};
use intake_core::{FieldConfigResolver, FormValidator, HeuristicResolver, Sanitizer, ValidationConfig};
use telemetry::{init_tracing, TracingConfig};
use throttle::{MemoryStore, SystemClock, Throttle, ThrottleConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Validate)]
struct AppConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    logging: TracingConfig,

    #[serde(default)]
    #[validate(nested)]
    api: ApiConfig,

    #[serde(default)]
    #[validate(nested)]
    validation: ValidationConfig,

    #[serde(default)]
    #[validate(nested)]
    throttle: ThrottleConfig,

    #[serde(default)]
    #[validate(nested)]
    notification: NotificationConfig,

    #[serde(default)]
    storage: StorageConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: TracingConfig::default(),
            api: ApiConfig::default(),
            validation: ValidationConfig::default(),
            throttle: ThrottleConfig::default(),
            notification: NotificationConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = load_config()?;

    init_tracing(&config.logging.clone().with_env_overrides());

    info!("Starting Form Intake v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;

    if config.throttle.secret == "change-me" || config.api.security.nonce_secret == "change-me" {
        warn!("Using default secrets; set FORM_INTAKE_THROTTLE__SECRET and FORM_INTAKE_API__SECURITY__NONCE_SECRET");
    }

    info!(
        max_submissions = config.throttle.max_submissions,
        window_secs = config.throttle.window_secs,
        storage = ?config.storage.backend,
        webhook = config.notification.webhook_url.is_some(),
        "Loaded configuration"
    );

    // Validation and sanitization share one resolver so both agree on field types
    let resolver: Arc<dyn FieldConfigResolver> =
        Arc::new(HeuristicResolver::new(&config.validation.fields));
    let sanitizer = Sanitizer::new(
        resolver.clone(),
        config.validation.types.allowed_url_schemes.clone(),
    );
    let validator = FormValidator::with_resolver(config.validation.clone(), resolver);

    let store = Arc::new(MemoryStore::new());
    let throttle = Arc::new(Throttle::new(
        config.throttle.clone(),
        store.clone(),
        Arc::new(SystemClock),
    ));

    let repository = build_repository(&config.storage)
        .await
        .context("Failed to open submission storage")?;

    let notifier: SharedNotifier = Arc::new(
        NotificationDispatcher::new(config.notification.clone())
            .context("Failed to create notification dispatcher")?,
    );

    let handler = SubmissionHandler::new(validator, sanitizer, throttle, repository, notifier);
    let state = AppState::new(handler, store.clone(), config.api.clone());

    // Start throttle store cleanup background task
    let _store_cleanup = start_store_cleanup(store, STORE_CLEANUP_INTERVAL);
    info!("Started throttle store cleanup task (every 5 minutes)");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Connect info feeds client address resolution
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<AppConfig> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&AppConfig::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables, e.g. FORM_INTAKE_THROTTLE__MAX_SUBMISSIONS
        .add_source(
            config::Environment::with_prefix("FORM_INTAKE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                // Lists arrive as comma-separated strings
                .list_separator(",")
                .with_list_parse_key("throttle.whitelist")
                .with_list_parse_key("api.security.trusted_proxies")
                .with_list_parse_key("notification.recipients")
                .with_list_parse_key("validation.types.allowed_url_schemes"),
        )
        .build()
        .context("Failed to build configuration")?;

    let config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
