//! # murmur
//!
//! Streaming speech recognition server binary: loads settings and models,
//! then serves recognition sessions over WebSocket until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use murmur_recognition::{ModelLoader, ModelRegistry, ModelSource, RecognizerOptions};
use murmur_server::{MurmurServer, ServerConfig};
use murmur_settings::{LanguageModel, MurmurSettings};

/// Hint printed when no model directory could be loaded.
const MODEL_HINT: &str = "download a model, e.g. \
    https://alphacephei.com/vosk/models/vosk-model-small-en-us-0.15.zip, \
    and unzip it to ./vosk-model (or pass --model / --language tag=dir)";

/// Streaming speech recognition server.
#[derive(Parser, Debug)]
#[command(name = "murmur", about = "Streaming speech recognition over WebSocket")]
struct Cli {
    /// Host to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind.
    #[arg(long)]
    port: Option<u16>,

    /// Model directory for the primary language.
    #[arg(long)]
    model: Option<String>,

    /// Additional language as `tag=dir` (repeatable).
    #[arg(long = "language", value_name = "TAG=DIR", value_parser = parse_language)]
    languages: Vec<LanguageModel>,

    /// Language new sessions start in.
    #[arg(long)]
    primary_language: Option<String>,

    /// Settings file (defaults to `~/.murmur/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log filter directive (overridden by `RUST_LOG`).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut MurmurSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref primary) = self.primary_language {
            settings.recognition.primary_language.clone_from(primary);
        }
        if let Some(ref model) = self.model {
            let primary = settings.recognition.primary_language.clone();
            settings.recognition.upsert_language(&primary, model.clone());
        }
        for language in &self.languages {
            settings
                .recognition
                .upsert_language(&language.tag, language.model_path.clone());
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }
}

fn parse_language(raw: &str) -> Result<LanguageModel, String> {
    let (tag, dir) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=DIR, got '{raw}'"))?;
    let (tag, dir) = (tag.trim(), dir.trim());
    if tag.is_empty() || dir.is_empty() {
        return Err(format!("expected TAG=DIR, got '{raw}'"));
    }
    Ok(LanguageModel::new(tag.to_lowercase(), dir))
}

/// Defaults, then the settings file, then env, then flags.
fn resolve_settings(cli: &Cli) -> Result<MurmurSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(murmur_settings::settings_path);
    let mut settings = murmur_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    cli.apply(&mut settings);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn model_sources(settings: &MurmurSettings) -> Vec<ModelSource> {
    settings
        .recognition
        .languages
        .iter()
        .map(|l| ModelSource::new(l.tag.clone(), l.model_path.clone()))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn recognizer_options(settings: &MurmurSettings) -> RecognizerOptions {
    RecognizerOptions {
        sample_rate: settings.recognition.sample_rate as f32,
        words: settings.recognition.words,
    }
}

fn build_registry(settings: &MurmurSettings, loader: &dyn ModelLoader) -> Result<Arc<ModelRegistry>> {
    let registry = ModelRegistry::load(
        &model_sources(settings),
        Some(&settings.recognition.primary_language),
        loader,
    )
    .context(MODEL_HINT)?;
    Ok(Arc::new(registry))
}

#[cfg(feature = "vosk")]
fn backend_loader(options: RecognizerOptions) -> Result<Box<dyn ModelLoader>> {
    Ok(Box::new(murmur_recognition::VoskLoader::new(options)))
}

#[cfg(not(feature = "vosk"))]
fn backend_loader(_options: RecognizerOptions) -> Result<Box<dyn ModelLoader>> {
    anyhow::bail!("murmur was built without a recognition backend; rebuild with `--features vosk`")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = murmur_logging::with_startup_logging(|| resolve_settings(&cli))?;

    murmur_logging::init_subscriber(&settings.logging.level, settings.logging.json);

    let loader = backend_loader(recognizer_options(&settings))?;
    let registry = build_registry(&settings, loader.as_ref())?;
    tracing::info!(
        languages = ?registry.available(),
        default_language = registry.default_tag(),
        "recognition models ready"
    );

    let metrics = murmur_server::metrics::install_recorder().context("Failed to install metrics")?;
    let server = MurmurServer::new(ServerConfig::from(&settings.server), registry).with_metrics(metrics);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("murmur listening on ws://{addr}/ws");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    if server.shutdown().graceful_shutdown(handle, None).await {
        tracing::info!("Shutdown complete");
    }
    Ok(())
}
