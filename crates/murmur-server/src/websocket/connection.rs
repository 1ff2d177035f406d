//! The per-connection message loop.
//!
//! Inbound messages are handled strictly in arrival order: each one is fully
//! processed (recognizer call plus every reply written) before the next is
//! read. Recognizer calls run on the blocking pool with the session moved in
//! and handed back.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use metrics::counter;
use murmur_recognition::{ModelRegistry, RecognitionSession, normalize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use super::command;
use super::router::{self, Inbound};
use crate::error::ConnectionError;
use crate::metrics::{
    AUDIO_BYTES_TOTAL, AUDIO_FRAMES_TOTAL, COMMAND_PARSE_FAILURES_TOTAL, FRAMES_PADDED_TOTAL,
};

/// How a connection ended without a fatal error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disconnect {
    /// The client sent a close frame.
    ClientClosed,
    /// The inbound stream ended without a close frame.
    StreamEnded,
    /// The server is shutting down.
    Shutdown,
    /// Reading or writing the transport failed.
    Transport(String),
}

impl Disconnect {
    /// Metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ClientClosed => "client_closed",
            Self::StreamEnded => "stream_ended",
            Self::Shutdown => "shutdown",
            Self::Transport(_) => "transport_error",
        }
    }
}

/// Run the session protocol over an inbound stream and an outbound sink.
///
/// Returns when the peer closes, the transport fails, or `shutdown` fires.
/// `Err` means the recognizer could not be (re)built.
pub async fn drive<St, Si>(
    mut inbound: St,
    mut outbound: Si,
    registry: Arc<ModelRegistry>,
    shutdown: CancellationToken,
) -> Result<Disconnect, ConnectionError>
where
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    let mut session = start_session(registry).await?;
    debug!(language = session.active_language(), "session ready");

    loop {
        let next = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                let _ = outbound.send(Message::Close(None)).await;
                return Ok(Disconnect::Shutdown);
            }
            next = inbound.next() => next,
        };

        let work = match next {
            None => return Ok(Disconnect::StreamEnded),
            Some(Err(e)) => {
                warn!(error = %e, "websocket read failed");
                return Ok(Disconnect::Transport(e.to_string()));
            }
            Some(Ok(Message::Close(_))) => return Ok(Disconnect::ClientClosed),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Binary(data))) => {
                counter!(AUDIO_FRAMES_TOTAL).increment(1);
                counter!(AUDIO_BYTES_TOTAL).increment(data.len() as u64);
                let frame = normalize(data.to_vec());
                if frame.was_padded() {
                    counter!(FRAMES_PADDED_TOTAL).increment(1);
                }
                Inbound::Frame(frame)
            }
            Some(Ok(Message::Text(text))) => match command::parse(text.as_str()) {
                Ok(cmd) => {
                    debug!(cmd = cmd.name(), "command received");
                    Inbound::Command(cmd)
                }
                Err(failure) => {
                    counter!(COMMAND_PARSE_FAILURES_TOTAL).increment(1);
                    warn!(error = %failure, "ignoring unparseable command");
                    continue;
                }
            },
        };

        let (returned, replies) = on_blocking_pool(session, move |s| router::handle(s, work)).await?;
        session = returned;

        for reply in replies? {
            let message = match reply.to_message() {
                Ok(message) => message,
                Err(e) => {
                    error!(kind = reply.kind(), error = %e, "failed to serialize reply");
                    continue;
                }
            };
            trace!(kind = reply.kind(), "sending reply");
            if let Err(e) = outbound.send(message).await {
                warn!(error = %e, "websocket write failed");
                return Ok(Disconnect::Transport(e.to_string()));
            }
        }
    }
}

async fn start_session(registry: Arc<ModelRegistry>) -> Result<RecognitionSession, ConnectionError> {
    let session = tokio::task::spawn_blocking(move || RecognitionSession::start(registry))
        .await
        .map_err(|e| ConnectionError::Worker(e.to_string()))??;
    Ok(session)
}

/// Move `session` onto the blocking pool, apply `f`, and hand both back.
async fn on_blocking_pool<T, F>(
    session: RecognitionSession,
    f: F,
) -> Result<(RecognitionSession, T), ConnectionError>
where
    F: FnOnce(&mut RecognitionSession) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut session = session;
        let out = f(&mut session);
        (session, out)
    })
    .await
    .map_err(|e| ConnectionError::Worker(e.to_string()))
}
