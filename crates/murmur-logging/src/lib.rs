//! # murmur-logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level; output goes to stderr as compact text or JSON lines.

#![deny(unsafe_code)]

#[cfg(any(test, feature = "test-support"))]
pub mod capture;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Build the filter: `RUST_LOG` if set and valid, else `level`, else `info`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup. Later calls are no-ops.
pub fn init_subscriber(level: &str, json: bool) {
    let filter = env_filter(level);

    if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact();
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init();
    }
}

/// Run `f` under a warn-level stderr subscriber scoped to this thread.
///
/// For work that runs before [`init_subscriber`], such as settings loading.
pub fn with_startup_logging<T>(f: impl FnOnce() -> T) -> T {
    with_startup_writer(std::io::stderr, true, f)
}

fn with_startup_writer<W, T>(writer: W, ansi: bool, f: impl FnOnce() -> T) -> T
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer)
        .compact()
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn init_subscriber_does_not_panic() {
        init_subscriber("warn", false);
        init_subscriber("debug", true);
    }

    #[test]
    fn invalid_level_falls_back() {
        let filter = env_filter("not a [valid directive");
        let _ = filter.to_string();
    }

    #[test]
    fn startup_logging_keeps_warnings_and_drops_info() {
        let buffer = Buffer::default();
        let value = with_startup_writer(buffer.clone(), false, || {
            tracing::info!("loading settings");
            tracing::warn!(key = "MURMUR_PORT", "invalid u16 env var, ignoring");
            7
        });
        assert_eq!(value, 7);
        let output = buffer.contents();
        assert!(output.contains("invalid u16 env var, ignoring"));
        assert!(output.contains("MURMUR_PORT"));
        assert!(!output.contains("loading settings"));
    }

    #[test]
    fn startup_logging_is_scoped_to_the_closure() {
        let buffer = Buffer::default();
        with_startup_writer(buffer.clone(), false, || {});
        tracing::warn!("after startup");
        assert!(!buffer.contents().contains("after startup"));
    }
}
