//! # murmur-server
//!
//! Axum HTTP + `WebSocket` server for streaming speech recognition.
//!
//! - `/ws`: one recognition session per connection (binary audio in,
//!   JSON partial/final results out, JSON commands in)
//! - `/health`: liveness plus loaded languages
//! - `/metrics`: Prometheus text
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{AppState, MurmurServer};
pub use shutdown::ShutdownCoordinator;
