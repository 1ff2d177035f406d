//! # murmur-recognition
//!
//! Recognition models and the per-connection session state machine.
//!
//! ```text
//! binary payload → frame::normalize → AudioFrame
//!   → RecognitionSession::feed → Recognizer (bound to the active language)
//!   → FeedOutcome::{Partial, Final, Silent}
//! ```
//!
//! The acoustic engine is an external collaborator behind the
//! [`Recognizer`] / [`AcousticModel`] / [`ModelLoader`] traits. The `vosk`
//! feature provides a backend over the Vosk runtime; the `test-support`
//! feature provides a scripted backend for deterministic tests.

#![deny(unsafe_code)]

pub mod error;
pub mod frame;
pub mod hypothesis;
pub mod recognizer;
pub mod registry;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

#[cfg(feature = "vosk")]
pub mod vosk_backend;

pub use error::{RecognitionError, RegistryError, SessionError};
pub use frame::{AudioFrame, normalize};
pub use hypothesis::{Hypothesis, WordTiming};
pub use recognizer::{AcousticModel, Decoding, ModelLoader, Recognizer, RecognizerOptions};
pub use registry::{ModelRegistry, ModelSource};
pub use session::{FeedOutcome, FinalResults, Finalized, RecognitionSession, SessionState};

#[cfg(feature = "vosk")]
pub use vosk_backend::VoskLoader;
