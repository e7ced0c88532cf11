//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode between startup and the final
//! report so `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: dilemma_core::config::ConfigError,
    },

    /// The world could not be built or advanced.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: dilemma_core::WorldError,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging init failed: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },

    /// The snapshot could not be serialized.
    #[error("export serialization failed: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The snapshot file could not be written.
    #[error("failed to write {path}: {source}")]
    Export {
        /// Destination file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
