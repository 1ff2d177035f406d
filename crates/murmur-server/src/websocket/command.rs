//! Inbound text commands.
//!
//! A command is a JSON object with a case-sensitive `cmd` field. Extra keys
//! are ignored.

use serde_json::Value;
use thiserror::Error;

/// Language requested by a `set_language` without a `language` field.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A parsed client command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Flush the current segment into the log.
    Finalize,
    /// Drop the recognizer and clear the log.
    Reset,
    /// Switch the active model.
    SetLanguage {
        /// Requested tag.
        language: String,
    },
    /// Dump the finalized segment log.
    GetFinalResults,
}

impl Command {
    /// Wire name, also used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Finalize => "finalize",
            Self::Reset => "reset",
            Self::SetLanguage { .. } => "set_language",
            Self::GetFinalResults => "get_final_results",
        }
    }
}

/// Why a text message was not a command. Never reported to the peer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    /// Valid JSON but not an object.
    #[error("command is not a JSON object")]
    NotAnObject,
    /// No string `cmd` field.
    #[error("missing or non-string 'cmd' field")]
    MissingCmd,
    /// `cmd` names no known command.
    #[error("unknown command '{0}'")]
    UnknownCmd(String),
    /// A known field has the wrong type.
    #[error("field '{0}' has the wrong type")]
    InvalidField(&'static str),
}

/// Parse one text message.
pub fn parse(text: &str) -> Result<Command, ParseFailure> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ParseFailure::NotAnObject);
    };
    let cmd = fields
        .get("cmd")
        .and_then(Value::as_str)
        .ok_or(ParseFailure::MissingCmd)?;

    match cmd {
        "finalize" => Ok(Command::Finalize),
        "reset" => Ok(Command::Reset),
        "get_final_results" => Ok(Command::GetFinalResults),
        "set_language" => {
            let language = match fields.get("language") {
                None | Some(Value::Null) => DEFAULT_LANGUAGE.to_string(),
                Some(Value::String(tag)) => tag.clone(),
                Some(_) => return Err(ParseFailure::InvalidField("language")),
            };
            Ok(Command::SetLanguage { language })
        }
        other => Err(ParseFailure::UnknownCmd(other.to_string())),
    }
}
