//! Flex registration server binary.
//!
//! Serves the flex period list, period details, and the registration
//! transaction over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Ephemeral server seeded from a fixture file
//! flexreg --seed seed/flexes.json
//!
//! # Persistent server
//! flexreg --listen 0.0.0.0:8080 --data /var/lib/flexreg
//!
//! # Environment variables instead of flags (flags win)
//! FLEXREG__LISTEN=0.0.0.0:8080 FLEXREG__DATA=/var/lib/flexreg flexreg
//! ```

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flexreg_server::config::{Config, LogFormat};
use flexreg_server::routes;
use flexreg_server::seed;
use flexreg_server::service::RegistrationService;
use flexreg_server::shutdown;
use flexreg_store::{EnrollmentStore, FileBackend, InMemoryBackend, StorageBackend};
use flexreg_types::RegistryError;

/// Top-level error type for the server binary, wrapping store and runtime failures.
#[derive(Debug)]
enum ServerError {
    Registry(RegistryError),
    Io(std::io::Error),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Registry(e) => write!(f, "registry error: {e}"),
            ServerError::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<RegistryError> for ServerError {
    fn from(err: RegistryError) -> Self {
        ServerError::Registry(err)
    }
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::parse();

    init_logging(&config);

    tracing::info!(listen_addr = %config.listen, "Starting flex registration service");

    // Warn if listening only on localhost
    if config.is_localhost_only() {
        tracing::warn!(
            "Listening on localhost only. Remote connections will be rejected. \
             Set --listen or FLEXREG__LISTEN to accept remote connections."
        );
    }

    match config.data.clone() {
        Some(dir) => {
            tracing::info!(data_dir = %dir.display(), "Using file-backed storage");
            let store = EnrollmentStore::open(FileBackend::open(dir)?)?;
            run(store, &config).await
        }
        None => {
            tracing::warn!(
                "Running in ephemeral mode. All registrations will be lost on shutdown. \
                 Set --data or FLEXREG__DATA for persistent storage."
            );
            let store = EnrollmentStore::open(InMemoryBackend::new())?;
            run(store, &config).await
        }
    }
}

/// Seeds the store if configured, then serves until a shutdown signal.
async fn run<B: StorageBackend + 'static>(
    store: EnrollmentStore<B>,
    config: &Config,
) -> Result<(), ServerError> {
    let store = Arc::new(store);

    if let Some(seed_path) = &config.seed {
        let periods = seed::load_seed_file(seed_path)?;
        let inserted = seed::apply_seed(&store, periods)?;
        tracing::info!(seed_file = %seed_path.display(), inserted, "Seed file processed");
    }

    let app = routes::router(RegistrationService::new(store));

    let listener = TcpListener::bind(config.listen).await.map_err(ServerError::Io)?;
    tracing::info!("Server ready, accepting connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(ServerError::Io)?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the logging system based on configuration.
///
/// Supports three formats:
/// - `Text`: Human-readable format (development)
/// - `Json`: JSON structured logging (production)
/// - `Auto`: JSON for non-TTY stdout, text otherwise
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = match config.log_format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !std::io::stdout().is_terminal(),
    };

    if use_json {
        // JSON format for production / log aggregation
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .init();
    } else {
        // Human-readable text format for development
        tracing_subscriber::registry().with(env_filter).with(fmt::layer()).init();
    }
}
