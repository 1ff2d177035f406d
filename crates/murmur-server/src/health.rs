//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

use murmur_recognition::ModelRegistry;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Current WebSocket connection count.
    pub connections: usize,
    /// Loaded language tags in load order.
    pub languages: Vec<String>,
    /// Language new sessions start in.
    pub default_language: String,
}

/// Build a health response from live counters.
pub fn health_check(
    start_time: Instant,
    connections: usize,
    registry: &ModelRegistry,
) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
        languages: registry.available(),
        default_language: registry.default_tag().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_recognition::testing::{ScriptedModel, scripted_registry};

    fn registry() -> std::sync::Arc<ModelRegistry> {
        scripted_registry(&[ScriptedModel::new("en"), ScriptedModel::new("ru")])
    }

    #[test]
    fn status_is_ok() {
        let resp = health_check(Instant::now(), 0, &registry());
        assert_eq!(resp.status, "ok");
    }

    #[test]
    fn uptime_increases() {
        let start = Instant::now()
            .checked_sub(std::time::Duration::from_secs(60))
            .unwrap();
        let resp = health_check(start, 0, &registry());
        assert!(resp.uptime_secs >= 59);
    }

    #[test]
    fn reports_languages() {
        let resp = health_check(Instant::now(), 3, &registry());
        assert_eq!(resp.connections, 3);
        assert_eq!(resp.languages, ["en", "ru"]);
        assert_eq!(resp.default_language, "en");
    }

    #[test]
    fn serialization() {
        let resp = health_check(Instant::now(), 2, &registry());
        let parsed = serde_json::to_value(&resp).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["connections"], 2);
        assert_eq!(parsed["default_language"], "en");
        assert!(parsed["uptime_secs"].is_number());
        assert!(parsed["languages"].is_array());
    }
}
