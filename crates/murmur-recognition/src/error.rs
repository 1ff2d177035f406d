//! Error types for models, registries, and sessions.

use thiserror::Error;

/// Errors raised by a recognition backend.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Model files missing or rejected by the backend.
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// The backend could not construct a recognizer for a loaded model.
    #[error("recognizer construction failed: {0}")]
    RecognizerInit(String),

    /// The backend failed while decoding a frame.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors raised while building the model registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Every configured language failed to load.
    #[error("no recognition model could be loaded (tried: {})", tried.join(", "))]
    NoModelsLoaded {
        /// Tags that were attempted, in configuration order.
        tried: Vec<String>,
    },
}

/// Errors surfaced by session commands.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested language has no loaded model.
    #[error("language '{requested}' is not available")]
    LanguageUnavailable {
        /// The tag the client asked for.
        requested: String,
        /// Every tag the registry can serve.
        available: Vec<String>,
    },

    /// A fresh recognizer could not be created. Fatal for the connection.
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}
