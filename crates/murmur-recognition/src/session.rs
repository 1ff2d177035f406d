//! Per-connection recognition session.
//!
//! A session owns exactly one live recognizer bound to its active language
//! and the log of segments finalized since the last reset. Every transition
//! (finalize, reset, language switch) drops the old recognizer and binds a
//! fresh one; recognizer state is never patched in place.
//!
//! An utterance completed by the recognizer during [`RecognitionSession::feed`]
//! is returned to the caller but NOT appended to the log. Only an explicit
//! [`RecognitionSession::finalize`] appends.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{RecognitionError, SessionError};
use crate::frame::AudioFrame;
use crate::hypothesis::Hypothesis;
use crate::recognizer::{Decoding, Recognizer};
use crate::registry::ModelRegistry;

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing processed yet.
    Idle,
    /// At least one frame or command processed.
    Listening,
}

/// What feeding one frame produced.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedOutcome {
    /// Non-empty partial text for the utterance in progress.
    Partial(String),
    /// The frame completed an utterance.
    Final(Hypothesis),
    /// Nothing to send (blank partial, or the frame failed to decode).
    Silent,
}

/// Result of an explicit finalize.
#[derive(Clone, Debug, PartialEq)]
pub struct Finalized {
    /// The recognizer's flushed hypothesis.
    pub hypothesis: Hypothesis,
    /// All finalized segments of the session joined by single spaces.
    pub full_text: String,
}

/// Snapshot of the finalized segment log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinalResults {
    /// Segments in arrival order.
    pub results: Vec<String>,
    /// Segments joined by single spaces.
    pub full_text: String,
    /// Number of segments.
    pub result_count: usize,
}

/// Recognition state for one connection.
pub struct RecognitionSession {
    registry: Arc<ModelRegistry>,
    active_language: String,
    recognizer: Box<dyn Recognizer>,
    final_segments: Vec<String>,
    state: SessionState,
    generation: u64,
}

impl RecognitionSession {
    /// Start a session in the registry's default language.
    pub fn start(registry: Arc<ModelRegistry>) -> Result<Self, RecognitionError> {
        let language = registry.default_tag().to_string();
        let recognizer = bind(&registry, &language)?;
        debug!(language, "recognition session started");
        Ok(Self {
            registry,
            active_language: language,
            recognizer,
            final_segments: Vec::new(),
            state: SessionState::Idle,
            generation: 0,
        })
    }

    /// Feed one frame to the live recognizer.
    pub fn feed(&mut self, frame: &AudioFrame) -> FeedOutcome {
        self.state = SessionState::Listening;
        match self.recognizer.accept_frame(frame) {
            Ok(Decoding::Completed) => {
                let hypothesis = self.recognizer.result();
                info!(language = %self.active_language, text = %hypothesis.text, "utterance completed");
                FeedOutcome::Final(hypothesis)
            }
            Ok(Decoding::Running) => {
                let partial = self.recognizer.partial_result();
                if partial.text.is_empty() {
                    FeedOutcome::Silent
                } else {
                    FeedOutcome::Partial(partial.text)
                }
            }
            Err(e) => {
                warn!(language = %self.active_language, error = %e, "frame rejected by recognizer");
                FeedOutcome::Silent
            }
        }
    }

    /// Force the current segment to finish and start a new one.
    ///
    /// Appends the flushed text to the log (blank text is dropped) and
    /// returns it together with the whole-session text.
    pub fn finalize(&mut self) -> Result<Finalized, RecognitionError> {
        self.state = SessionState::Listening;
        let hypothesis = self.recognizer.final_result();
        if !hypothesis.is_blank() {
            self.final_segments.push(hypothesis.text.clone());
        }
        info!(
            language = %self.active_language,
            text = %hypothesis.text,
            segments = self.final_segments.len(),
            "segment finalized"
        );
        self.rebind(self.active_language.clone())?;
        Ok(Finalized {
            hypothesis,
            full_text: self.full_text(),
        })
    }

    /// Discard the recognizer and the segment log.
    pub fn reset(&mut self) -> Result<(), RecognitionError> {
        self.state = SessionState::Listening;
        self.final_segments.clear();
        self.rebind(self.active_language.clone())?;
        debug!(language = %self.active_language, "session reset");
        Ok(())
    }

    /// Switch to another loaded language.
    ///
    /// The segment log carries over. An unknown tag leaves the session
    /// untouched.
    pub fn set_language(&mut self, tag: &str) -> Result<(), SessionError> {
        if !self.registry.contains(tag) {
            return Err(SessionError::LanguageUnavailable {
                requested: tag.to_string(),
                available: self.registry.available(),
            });
        }
        self.state = SessionState::Listening;
        self.rebind(tag.to_string())?;
        info!(language = tag, "language changed");
        Ok(())
    }

    /// The finalized segments so far.
    pub fn final_results(&self) -> FinalResults {
        FinalResults {
            results: self.final_segments.clone(),
            full_text: self.full_text(),
            result_count: self.final_segments.len(),
        }
    }

    /// Current language tag.
    pub fn active_language(&self) -> &str {
        &self.active_language
    }

    /// Finalized segments in arrival order.
    pub fn segments(&self) -> &[String] {
        &self.final_segments
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// How many times the recognizer has been replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn full_text(&self) -> String {
        self.final_segments
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn rebind(&mut self, language: String) -> Result<(), RecognitionError> {
        // Build first so a failure leaves language and recognizer consistent.
        let recognizer = bind(&self.registry, &language)?;
        self.recognizer = recognizer;
        self.active_language = language;
        self.generation += 1;
        Ok(())
    }
}

fn bind(registry: &ModelRegistry, language: &str) -> Result<Box<dyn Recognizer>, RecognitionError> {
    registry
        .resolve(language)
        .ok_or_else(|| RecognitionError::ModelNotAvailable(language.to_string()))?
        .new_recognizer()
}

impl std::fmt::Debug for RecognitionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionSession")
            .field("active_language", &self.active_language)
            .field("final_segments", &self.final_segments)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
