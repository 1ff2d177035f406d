//! Applies parsed commands and audio frames to a session.
//!
//! Runs on the blocking pool: every call here may enter the recognizer.

use metrics::counter;
use murmur_recognition::{
    AudioFrame, FeedOutcome, RecognitionError, RecognitionSession, SessionError,
};

use super::command::Command;
use super::messages::Outbound;
use crate::metrics::{COMMANDS_TOTAL, FINAL_RESULTS_TOTAL};

/// Work item for one inbound message.
#[derive(Debug)]
pub enum Inbound {
    /// A normalized audio frame.
    Frame(AudioFrame),
    /// A parsed command.
    Command(Command),
}

/// Process one inbound item, returning the replies in send order.
///
/// An error means the session can no longer bind a recognizer and the
/// connection must close.
pub fn handle(
    session: &mut RecognitionSession,
    inbound: Inbound,
) -> Result<Vec<Outbound>, RecognitionError> {
    match inbound {
        Inbound::Frame(frame) => Ok(feed(session, &frame).into_iter().collect()),
        Inbound::Command(command) => dispatch(session, command),
    }
}

/// Feed one frame. At most one reply.
pub fn feed(session: &mut RecognitionSession, frame: &AudioFrame) -> Option<Outbound> {
    match session.feed(frame) {
        FeedOutcome::Partial(text) => Some(Outbound::Partial(text)),
        FeedOutcome::Final(hypothesis) => {
            counter!(FINAL_RESULTS_TOTAL, "source" => "stream").increment(1);
            Some(Outbound::Final(hypothesis))
        }
        FeedOutcome::Silent => None,
    }
}

/// Apply a command.
pub fn dispatch(
    session: &mut RecognitionSession,
    command: Command,
) -> Result<Vec<Outbound>, RecognitionError> {
    counter!(COMMANDS_TOTAL, "cmd" => command.name()).increment(1);
    match command {
        Command::Finalize => {
            let finalized = session.finalize()?;
            counter!(FINAL_RESULTS_TOTAL, "source" => "finalize").increment(1);
            Ok(vec![
                Outbound::Final(finalized.hypothesis),
                Outbound::FullResult(finalized.full_text),
            ])
        }
        Command::Reset => {
            session.reset()?;
            Ok(Vec::new())
        }
        Command::SetLanguage { language } => match session.set_language(&language) {
            Ok(()) => Ok(vec![Outbound::LanguageChanged(language)]),
            Err(SessionError::LanguageUnavailable {
                requested,
                available,
            }) => Ok(vec![Outbound::LanguageError {
                message: format!("Language '{requested}' not available"),
                available,
            }]),
            Err(SessionError::Recognition(e)) => Err(e),
        },
        Command::GetFinalResults => Ok(vec![Outbound::FinalResults(session.final_results())]),
    }
}
