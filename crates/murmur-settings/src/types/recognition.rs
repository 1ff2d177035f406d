//! Recognition model settings.

use serde::{Deserialize, Serialize};

/// Lowest accepted input sample rate.
pub const MIN_SAMPLE_RATE: u32 = 8_000;
/// Highest accepted input sample rate.
pub const MAX_SAMPLE_RATE: u32 = 48_000;

/// A language tag and the directory of its model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageModel {
    /// Language tag, e.g. `"en"`.
    pub tag: String,
    /// Model directory.
    pub model_path: String,
}

impl LanguageModel {
    /// Create an entry.
    pub fn new(tag: impl Into<String>, model_path: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            model_path: model_path.into(),
        }
    }
}

/// Models to load and options for every recognizer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognitionSettings {
    /// Language new sessions start in, when its model loads.
    pub primary_language: String,
    /// Input sample rate in Hz.
    pub sample_rate: u32,
    /// Include per-word timings in final results.
    pub words: bool,
    /// Languages in load order.
    pub languages: Vec<LanguageModel>,
}

impl RecognitionSettings {
    /// Set the model directory for `tag`, adding the language if needed.
    pub fn upsert_language(&mut self, tag: &str, model_path: impl Into<String>) {
        let model_path = model_path.into();
        if let Some(entry) = self.languages.iter_mut().find(|l| l.tag == tag) {
            entry.model_path = model_path;
        } else {
            self.languages.push(LanguageModel::new(tag, model_path));
        }
    }
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            primary_language: "en".to_string(),
            sample_rate: 16_000,
            words: true,
            languages: vec![LanguageModel::new("en", "./vosk-model")],
        }
    }
}
