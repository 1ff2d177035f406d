//! Recognizer result payloads.

use serde::Serialize;

/// Timing and confidence for one recognized word.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordTiming {
    /// Confidence in `0.0..=1.0`.
    pub conf: f32,
    /// Start offset in seconds.
    pub start: f32,
    /// End offset in seconds.
    pub end: f32,
    /// The word itself.
    pub word: String,
}

/// A partial or final recognizer hypothesis.
///
/// Serializes as `{"text": "...", "result": [...]}`; `result` is omitted
/// when the backend supplied no word timings.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Hypothesis {
    /// Transcribed text.
    pub text: String,
    /// Per-word timings, when the backend provides them.
    #[serde(rename = "result", skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordTiming>,
}

impl Hypothesis {
    /// A hypothesis with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            words: Vec::new(),
        }
    }

    /// Attach word timings.
    #[must_use]
    pub fn with_words(mut self, words: Vec<WordTiming>) -> Self {
        self.words = words;
        self
    }

    /// Whether the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
