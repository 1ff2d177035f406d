//! WebSocket protocol: command parsing, dispatch, outbound framing, and the
//! per-connection loop.

pub mod command;
pub mod connection;
pub mod messages;
pub mod router;
pub mod session;
