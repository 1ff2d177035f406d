//! Vosk backend (enabled with the `vosk` feature).
//!
//! Requires the native `libvosk` library at link time.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use ::vosk::{CompleteResult, DecodingState, Model};

use crate::error::RecognitionError;
use crate::frame::AudioFrame;
use crate::hypothesis::{Hypothesis, WordTiming};
use crate::recognizer::{AcousticModel, Decoding, ModelLoader, Recognizer, RecognizerOptions};

/// Loads Vosk model directories.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoskLoader {
    options: RecognizerOptions,
}

impl VoskLoader {
    /// A loader whose recognizers use `options`.
    pub fn new(options: RecognizerOptions) -> Self {
        Self { options }
    }
}

impl ModelLoader for VoskLoader {
    fn load(&self, tag: &str, path: &Path) -> Result<Arc<dyn AcousticModel>, RecognitionError> {
        debug!(tag, path = %path.display(), "loading vosk model");
        let model = Model::new(path.to_string_lossy()).ok_or_else(|| {
            RecognitionError::ModelNotAvailable(format!(
                "vosk rejected model directory {}",
                path.display()
            ))
        })?;
        Ok(Arc::new(VoskModel {
            model,
            options: self.options,
        }))
    }
}

struct VoskModel {
    model: Model,
    options: RecognizerOptions,
}

impl AcousticModel for VoskModel {
    fn new_recognizer(&self) -> Result<Box<dyn Recognizer>, RecognitionError> {
        let mut inner = ::vosk::Recognizer::new(&self.model, self.options.sample_rate)
            .ok_or_else(|| {
                RecognitionError::RecognizerInit(format!(
                    "vosk refused sample rate {}",
                    self.options.sample_rate
                ))
            })?;
        inner.set_words(self.options.words);
        Ok(Box::new(VoskRecognizer { inner }))
    }
}

struct VoskRecognizer {
    inner: ::vosk::Recognizer,
}

impl Recognizer for VoskRecognizer {
    fn accept_frame(&mut self, frame: &AudioFrame) -> Result<Decoding, RecognitionError> {
        match self.inner.accept_waveform(&frame.samples()) {
            Ok(DecodingState::Finalized) => Ok(Decoding::Completed),
            Ok(DecodingState::Running) => Ok(Decoding::Running),
            Ok(DecodingState::Failed) => Err(RecognitionError::Decode("vosk decoding failed".into())),
            Err(e) => Err(RecognitionError::Decode(format!("{e:?}"))),
        }
    }

    fn result(&mut self) -> Hypothesis {
        complete_to_hypothesis(self.inner.result())
    }

    fn partial_result(&mut self) -> Hypothesis {
        Hypothesis::new(self.inner.partial_result().partial)
    }

    fn final_result(&mut self) -> Hypothesis {
        complete_to_hypothesis(self.inner.final_result())
    }
}

fn complete_to_hypothesis(result: CompleteResult<'_>) -> Hypothesis {
    let Some(single) = result.single() else {
        return Hypothesis::default();
    };
    let words = single
        .result
        .iter()
        .map(|w| WordTiming {
            conf: w.conf,
            start: w.start,
            end: w.end,
            word: w.word.to_string(),
        })
        .collect();
    Hypothesis::new(single.text).with_words(words)
}
