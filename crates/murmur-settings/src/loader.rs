//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`MurmurSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply `MURMUR_*` environment variable overrides
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{
    MAX_MESSAGE_BYTES, MAX_SAMPLE_RATE, MIN_MESSAGE_BYTES, MIN_SAMPLE_RATE, MurmurSettings,
};

/// Prefix of the per-language model directory variables (`MURMUR_MODEL_RU=...`).
pub const MODEL_ENV_PREFIX: &str = "MURMUR_MODEL_";

/// Resolve the path to the settings file (`~/.murmur/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".murmur").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<MurmurSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<MurmurSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Load file settings over defaults, without consulting the environment.
pub fn read_settings_file(path: &Path) -> Result<MurmurSettings> {
    let defaults = serde_json::to_value(MurmurSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut MurmurSettings) {
    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read_env_string("MURMUR_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("MURMUR_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = read_env_usize("MURMUR_MAX_MESSAGE_BYTES", MIN_MESSAGE_BYTES, MAX_MESSAGE_BYTES)
    {
        settings.server.max_message_bytes = v;
    }

    // ── Recognition ─────────────────────────────────────────────────
    if let Some(v) = read_env_string("MURMUR_PRIMARY_LANGUAGE") {
        settings.recognition.primary_language = v;
    }
    if let Some(v) = read_env_u32("MURMUR_SAMPLE_RATE", MIN_SAMPLE_RATE, MAX_SAMPLE_RATE) {
        settings.recognition.sample_rate = v;
    }
    if let Some(v) = read_env_bool("MURMUR_WORDS") {
        settings.recognition.words = v;
    }
    apply_model_overrides(settings, std::env::vars());

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("MURMUR_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool("MURMUR_LOG_JSON") {
        settings.logging.json = v;
    }
}

/// Apply `MURMUR_MODEL_<TAG>=<dir>` pairs, lowercasing the tag.
pub fn apply_model_overrides(
    settings: &mut MurmurSettings,
    vars: impl IntoIterator<Item = (String, String)>,
) {
    let mut overrides: Vec<(String, String)> = vars
        .into_iter()
        .filter_map(|(key, value)| {
            let tag = key.strip_prefix(MODEL_ENV_PREFIX)?.to_lowercase();
            (!tag.is_empty() && !value.is_empty()).then_some((tag, value))
        })
        .collect();
    overrides.sort();
    for (tag, path) in overrides {
        debug!(%tag, %path, "model path from environment");
        settings.recognition.upsert_language(&tag, path);
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
