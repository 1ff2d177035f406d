//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a partial
//! JSON file only needs the fields it changes.

mod recognition;
mod server;

pub use recognition::*;
pub use server::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 2700 },
///   "recognition": {
///     "primaryLanguage": "en",
///     "languages": [
///       { "tag": "en", "modelPath": "./vosk-model" },
///       { "tag": "ru", "modelPath": "./vosk-model-ru" }
///     ]
///   },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MurmurSettings {
    /// Network settings.
    pub server: ServerSettings,
    /// Models and recognizer options.
    pub recognition: RecognitionSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl MurmurSettings {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.recognition.languages.is_empty() {
            return Err(SettingsError::InvalidValue(
                "no recognition languages configured".into(),
            ));
        }
        if let Some(entry) = self
            .recognition
            .languages
            .iter()
            .find(|l| l.tag.trim().is_empty())
        {
            return Err(SettingsError::InvalidValue(format!(
                "language entry for '{}' has an empty tag",
                entry.model_path
            )));
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.recognition.sample_rate) {
            return Err(SettingsError::InvalidValue(format!(
                "sample rate {} outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE}",
                self.recognition.sample_rate
            )));
        }
        if !(MIN_MESSAGE_BYTES..=MAX_MESSAGE_BYTES).contains(&self.server.max_message_bytes) {
            return Err(SettingsError::InvalidValue(format!(
                "max message size {} outside {MIN_MESSAGE_BYTES}..={MAX_MESSAGE_BYTES}",
                self.server.max_message_bytes
            )));
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive (`RUST_LOG` takes precedence).
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
