//! Error types for the dashboard client

use std::path::PathBuf;
use thiserror::Error;

/// Inbound sync payload could not be turned into a delta
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Malformed delta payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Delta payload is not a JSON object (got {0})")]
    NotAnObject(&'static str),
}

/// Item display catalog could not be loaded
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to fetch catalog: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Catalog is not a name mapping: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid page URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Transport-level channel failures
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Connection failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("Receive error: {0}")]
    Receive(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("Send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid handshake request: {0}")]
    Handshake(String),
}
