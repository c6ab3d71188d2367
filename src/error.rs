use std::io;

use crate::config::ConfigError;

/// Failures while signing or contacting the downstream target. All of them
/// surface to the caller as a 500 with an `{"error": ...}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to sign request body: {0}")]
    Signing(String),

    #[error("Invalid header value for {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("Invalid destination URL {url:?}: {reason}")]
    InvalidDestination { url: String, reason: String },

    #[error("Request to downstream failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Startup failures for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Relay setup failed: {0}")]
    Relay(#[from] RelayError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
