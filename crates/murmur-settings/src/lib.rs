//! # murmur-settings
//!
//! Configuration for the murmur recognition server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`MurmurSettings::default()`]
//! 2. **Settings file**: `~/.murmur/settings.json` or an explicit path,
//!    deep-merged over defaults
//! 3. **Environment variables**: `MURMUR_*` overrides (highest priority)
//!
//! Command-line flags are applied on top by the binary.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
