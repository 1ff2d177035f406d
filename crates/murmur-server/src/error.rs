//! Server error types.

use murmur_recognition::RecognitionError;
use thiserror::Error;

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not bind.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Other listener I/O failure.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The global metrics recorder could not be installed.
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}

/// Errors that end a single connection abnormally.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A recognizer could not be built for the session.
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    /// The blocking recognizer task panicked or was cancelled.
    #[error("recognizer task failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_display() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:2700".into(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(err.to_string(), "failed to bind 0.0.0.0:2700: in use");
    }

    #[test]
    fn recognition_error_is_transparent() {
        let err = ConnectionError::from(RecognitionError::RecognizerInit("oom".into()));
        assert_eq!(
            err.to_string(),
            RecognitionError::RecognizerInit("oom".into()).to_string()
        );
    }
}
