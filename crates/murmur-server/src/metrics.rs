//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::ServerError;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the handle used to render `/metrics`. Call once at startup
/// before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// WebSocket disconnections total (counter, labels: reason).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Connection lifetime in seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Binary audio frames received (counter).
pub const AUDIO_FRAMES_TOTAL: &str = "audio_frames_total";
/// Audio bytes received before padding (counter).
pub const AUDIO_BYTES_TOTAL: &str = "audio_bytes_total";
/// Odd-length frames padded with a zero byte (counter).
pub const FRAMES_PADDED_TOTAL: &str = "frames_padded_total";
/// Commands accepted (counter, labels: cmd).
pub const COMMANDS_TOTAL: &str = "commands_total";
/// Text messages that did not parse as a command (counter).
pub const COMMAND_PARSE_FAILURES_TOTAL: &str = "command_parse_failures_total";
/// Final results sent (counter, labels: source = `stream` | `finalize`).
pub const FINAL_RESULTS_TOTAL: &str = "final_results_total";
