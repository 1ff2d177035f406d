//! Outbound JSON messages.

use axum::extract::ws::Message;
use murmur_recognition::{FinalResults, Hypothesis};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A message the server sends to the client.
#[derive(Clone, Debug, PartialEq)]
pub enum Outbound {
    /// `{"partial": text}`
    Partial(String),
    /// `{"text": ..., "result": [...]}`
    Final(Hypothesis),
    /// `{"full_result": text}`
    FullResult(String),
    /// `{"status": "language_changed", "language": tag}`
    LanguageChanged(String),
    /// `{"status": "language_error", "message": ..., "available": [...]}`
    LanguageError {
        /// Human-readable reason.
        message: String,
        /// Tags that are loaded.
        available: Vec<String>,
    },
    /// `{"cmd": "final_results", "results": [...], "full_text": ..., "result_count": n}`
    FinalResults(FinalResults),
}

impl Outbound {
    /// Serialize to JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize into a WebSocket text frame.
    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(self.to_json()?.into()))
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Partial(_) => "partial",
            Self::Final(_) => "final",
            Self::FullResult(_) => "full_result",
            Self::LanguageChanged(_) => "language_changed",
            Self::LanguageError { .. } => "language_error",
            Self::FinalResults(_) => "final_results",
        }
    }
}

impl Serialize for Outbound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Final(hypothesis) => hypothesis.serialize(serializer),
            Self::Partial(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("partial", text)?;
                map.end()
            }
            Self::FullResult(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("full_result", text)?;
                map.end()
            }
            Self::LanguageChanged(tag) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("status", "language_changed")?;
                map.serialize_entry("language", tag)?;
                map.end()
            }
            Self::LanguageError { message, available } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("status", "language_error")?;
                map.serialize_entry("message", message)?;
                map.serialize_entry("available", available)?;
                map.end()
            }
            Self::FinalResults(snapshot) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("cmd", "final_results")?;
                map.serialize_entry("results", &snapshot.results)?;
                map.serialize_entry("full_text", &snapshot.full_text)?;
                map.serialize_entry("result_count", &snapshot.result_count)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_recognition::WordTiming;
    use serde_json::{Value, json};

    fn value(msg: &Outbound) -> Value {
        serde_json::from_str(&msg.to_json().unwrap()).unwrap()
    }

    #[test]
    fn partial_shape() {
        assert_eq!(
            value(&Outbound::Partial("hel".into())),
            json!({"partial": "hel"})
        );
    }

    #[test]
    fn final_without_words_omits_result() {
        let msg = Outbound::Final(Hypothesis::new("hello"));
        assert_eq!(value(&msg), json!({"text": "hello"}));
    }

    #[test]
    fn final_with_words() {
        let msg = Outbound::Final(Hypothesis::new("hi").with_words(vec![WordTiming {
            conf: 1.0,
            start: 0.5,
            end: 0.75,
            word: "hi".into(),
        }]));
        assert_eq!(
            value(&msg),
            json!({"text": "hi", "result": [{"conf": 1.0, "start": 0.5, "end": 0.75, "word": "hi"}]})
        );
    }

    #[test]
    fn full_result_shape() {
        assert_eq!(
            value(&Outbound::FullResult("one two".into())),
            json!({"full_result": "one two"})
        );
    }

    #[test]
    fn language_messages() {
        assert_eq!(
            value(&Outbound::LanguageChanged("ru".into())),
            json!({"status": "language_changed", "language": "ru"})
        );
        assert_eq!(
            value(&Outbound::LanguageError {
                message: "Language 'de' not available".into(),
                available: vec!["en".into(), "ru".into()],
            }),
            json!({
                "status": "language_error",
                "message": "Language 'de' not available",
                "available": ["en", "ru"],
            })
        );
    }

    #[test]
    fn final_results_shape() {
        let msg = Outbound::FinalResults(FinalResults {
            results: vec!["one".into(), "two".into()],
            full_text: "one two".into(),
            result_count: 2,
        });
        assert_eq!(
            value(&msg),
            json!({
                "cmd": "final_results",
                "results": ["one", "two"],
                "full_text": "one two",
                "result_count": 2,
            })
        );
    }

    #[test]
    fn to_message_is_text_frame() {
        let msg = Outbound::Partial("x".into()).to_message().unwrap();
        assert!(matches!(msg, Message::Text(ref t) if t.as_str() == r#"{"partial":"x"}"#));
    }
}
