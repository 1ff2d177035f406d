//! Backend seams: loaders produce models, models produce recognizers.

use std::path::Path;
use std::sync::Arc;

use crate::error::RecognitionError;
use crate::frame::AudioFrame;
use crate::hypothesis::Hypothesis;

/// Default input sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 16_000.0;

/// Decoder state after accepting a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoding {
    /// The utterance is still in progress.
    Running,
    /// The frame completed an utterance; [`Recognizer::result`] holds it.
    Completed,
}

/// Live decoding state for one stream of audio.
///
/// Not reentrant. A session owns exactly one and replaces it wholesale
/// instead of resetting it.
pub trait Recognizer: Send {
    /// Feed one normalized frame.
    fn accept_frame(&mut self, frame: &AudioFrame) -> Result<Decoding, RecognitionError>;

    /// Hypothesis for the utterance completed by the last frame.
    fn result(&mut self) -> Hypothesis;

    /// Text recognized so far in the current utterance.
    fn partial_result(&mut self) -> Hypothesis;

    /// Flush the decoder and return whatever it has, complete or not.
    fn final_result(&mut self) -> Hypothesis;
}

/// A loaded acoustic/language model for one language tag.
///
/// Shared read-only across every connection.
pub trait AcousticModel: Send + Sync {
    /// Create a fresh recognizer bound to this model.
    fn new_recognizer(&self) -> Result<Box<dyn Recognizer>, RecognitionError>;
}

/// Loads models from disk at startup.
pub trait ModelLoader: Send + Sync {
    /// Load the model for `tag` from `path`.
    fn load(&self, tag: &str, path: &Path) -> Result<Arc<dyn AcousticModel>, RecognitionError>;
}

/// Options applied to every recognizer a backend creates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecognizerOptions {
    /// Input sample rate in Hz.
    pub sample_rate: f32,
    /// Emit per-word timings in final hypotheses.
    pub words: bool,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            words: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = RecognizerOptions::default();
        assert_eq!(opts.sample_rate, 16_000.0);
        assert!(opts.words);
    }
}
