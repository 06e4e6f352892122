//! Server configuration.
//!
//! Configuration comes from CLI arguments with environment-variable
//! fallbacks (`FLEXREG__*`); CLI arguments win. No data directory means
//! ephemeral mode: registrations live in memory and vanish on shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format (development).
    Text,
    /// JSON structured logging (production).
    Json,
    /// JSON for non-TTY stdout, text otherwise.
    Auto,
}

/// Server configuration.
#[derive(Debug, Parser)]
#[command(name = "flexreg", about = "Flex registration service", version)]
pub struct Config {
    /// Address to listen on for HTTP.
    #[arg(long, env = "FLEXREG__LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Data directory for persisted flex periods. If not set, the server
    /// runs ephemeral: all state is in memory and lost on shutdown.
    #[arg(long, env = "FLEXREG__DATA")]
    pub data: Option<PathBuf>,

    /// JSON seed file of flex periods, loaded at startup when the store is
    /// empty.
    #[arg(long, env = "FLEXREG__SEED")]
    pub seed: Option<PathBuf>,

    /// Log output format.
    #[arg(long, env = "FLEXREG__LOG_FORMAT", value_enum, default_value_t = LogFormat::Auto)]
    pub log_format: LogFormat,
}

impl Config {
    /// Whether the server runs without durable storage.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.data.is_none()
    }

    /// Whether the listen address only accepts local connections.
    #[must_use]
    pub fn is_localhost_only(&self) -> bool {
        self.listen.ip().is_loopback()
    }
}
