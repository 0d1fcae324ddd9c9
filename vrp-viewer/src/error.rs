//! Error types used by the crate.

use thiserror::Error;

/// Viewer error type.
///
/// The `Display` output of every variant is what the user sees in the status panel after the
/// `"Error: "` prefix, so the messages are kept short and free of debug formatting.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Solve was requested before a depot was placed.
    #[error("Please set a depot first!")]
    NoDepot,
    /// The request did not reach the server or the connection failed mid-way.
    #[error("{0}")]
    Network(String),
    /// The server answered with a non-success HTTP status.
    #[error("{0}")]
    Server(String),
    /// The server answered successfully, but the solver reported a failure.
    #[error("{0}")]
    Solver(String),
    /// Response body or a GeoJSON document could not be decoded.
    #[error("{0}")]
    Decoding(String),
    /// Map surface failed to add or remove a layer.
    #[error("rendering failed: {0}")]
    Rendering(String),
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Error reading a file.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ViewerError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decoding(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}

impl From<geojson::Error> for ViewerError {
    fn from(value: geojson::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}
