//! Scripted recognition backend for deterministic tests.
//!
//! Each [`ScriptedModel`] owns a queue of [`Step`]s consumed one per frame by
//! whichever recognizer it created last, plus a queue of texts returned by
//! forced finalization. Counters record how many recognizers were created
//! and which frames arrived.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::RecognitionError;
use crate::frame::AudioFrame;
use crate::hypothesis::{Hypothesis, WordTiming};
use crate::recognizer::{AcousticModel, Decoding, ModelLoader, Recognizer};
use crate::registry::ModelRegistry;

/// What a scripted recognizer does with the next frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Keep decoding; the partial hypothesis becomes this text.
    Partial(String),
    /// Complete an utterance with this text.
    Complete(String),
    /// Report a decoding failure.
    Fail,
}

#[derive(Default)]
struct ScriptState {
    steps: VecDeque<Step>,
    finals: VecDeque<String>,
    recognizers_created: usize,
    frames: Vec<Vec<u8>>,
    fail_construction: bool,
}

/// A model whose recognizers follow a shared script.
pub struct ScriptedModel {
    tag: String,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedModel {
    /// Create an empty script for `tag`.
    pub fn new(tag: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            tag: tag.into(),
            state: Arc::new(Mutex::new(ScriptState::default())),
        })
    }

    /// The language this model serves.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Queue the outcome of the next frame.
    pub fn push_step(&self, step: Step) {
        self.state.lock().steps.push_back(step);
    }

    /// Queue the text returned by the next forced finalization.
    pub fn push_final(&self, text: impl Into<String>) {
        self.state.lock().finals.push_back(text.into());
    }

    /// Make every later `new_recognizer` call fail.
    pub fn fail_construction(&self) {
        self.state.lock().fail_construction = true;
    }

    /// How many recognizers this model has produced.
    pub fn recognizers_created(&self) -> usize {
        self.state.lock().recognizers_created
    }

    /// Every frame fed to this model's recognizers, in order.
    pub fn frames_received(&self) -> Vec<Vec<u8>> {
        self.state.lock().frames.clone()
    }
}

impl AcousticModel for ScriptedModel {
    fn new_recognizer(&self) -> Result<Box<dyn Recognizer>, RecognitionError> {
        let mut state = self.state.lock();
        if state.fail_construction {
            return Err(RecognitionError::RecognizerInit(format!(
                "scripted failure for '{}'",
                self.tag
            )));
        }
        state.recognizers_created += 1;
        Ok(Box::new(ScriptedRecognizer {
            state: Arc::clone(&self.state),
            partial: String::new(),
            completed: None,
        }))
    }
}

struct ScriptedRecognizer {
    state: Arc<Mutex<ScriptState>>,
    partial: String,
    completed: Option<String>,
}

impl Recognizer for ScriptedRecognizer {
    fn accept_frame(&mut self, frame: &AudioFrame) -> Result<Decoding, RecognitionError> {
        let step = {
            let mut state = self.state.lock();
            state.frames.push(frame.as_bytes().to_vec());
            state.steps.pop_front()
        };
        match step {
            None => Ok(Decoding::Running),
            Some(Step::Partial(text)) => {
                self.partial = text;
                Ok(Decoding::Running)
            }
            Some(Step::Complete(text)) => {
                self.partial.clear();
                self.completed = Some(text);
                Ok(Decoding::Completed)
            }
            Some(Step::Fail) => Err(RecognitionError::Decode("scripted failure".into())),
        }
    }

    fn result(&mut self) -> Hypothesis {
        let text = self.completed.take().unwrap_or_default();
        with_fake_timings(text)
    }

    fn partial_result(&mut self) -> Hypothesis {
        Hypothesis::new(self.partial.clone())
    }

    fn final_result(&mut self) -> Hypothesis {
        let scripted = self.state.lock().finals.pop_front();
        let text = scripted.unwrap_or_else(|| std::mem::take(&mut self.partial));
        with_fake_timings(text)
    }
}

fn with_fake_timings(text: String) -> Hypothesis {
    let words = text
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            #[allow(clippy::cast_precision_loss)]
            let start = i as f32 * 0.5;
            WordTiming {
                conf: 1.0,
                start,
                end: start + 0.5,
                word: word.to_string(),
            }
        })
        .collect();
    Hypothesis::new(text).with_words(words)
}

/// Loader that serves scripted models for a fixed set of tags.
pub struct ScriptedLoader {
    models: HashMap<String, Arc<ScriptedModel>>,
}

impl ScriptedLoader {
    /// A loader that succeeds for exactly `tags`.
    pub fn with_languages(tags: &[&str]) -> Self {
        Self {
            models: tags
                .iter()
                .map(|tag| ((*tag).to_string(), ScriptedModel::new(*tag)))
                .collect(),
        }
    }

    /// The scripted model for `tag`, if this loader serves it.
    pub fn model(&self, tag: &str) -> Option<Arc<ScriptedModel>> {
        self.models.get(tag).cloned()
    }
}

impl ModelLoader for ScriptedLoader {
    fn load(&self, tag: &str, _path: &Path) -> Result<Arc<dyn AcousticModel>, RecognitionError> {
        self.models
            .get(tag)
            .map(|model| Arc::clone(model) as Arc<dyn AcousticModel>)
            .ok_or_else(|| RecognitionError::ModelNotAvailable(format!("no script for '{tag}'")))
    }
}

/// Build a registry directly from scripted models, first tag as default.
pub fn scripted_registry(models: &[Arc<ScriptedModel>]) -> Arc<ModelRegistry> {
    let entries = models
        .iter()
        .map(|m| (m.tag().to_string(), Arc::clone(m) as Arc<dyn AcousticModel>))
        .collect();
    match ModelRegistry::from_models(entries, None) {
        Ok(registry) => Arc::new(registry),
        Err(e) => panic!("scripted registry needs at least one model: {e}"),
    }
}
