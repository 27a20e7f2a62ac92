//! Installs the process-wide `tracing` subscriber.

use crate::config::{LogFormat, Settings};
use tracing_subscriber::EnvFilter;

/// Sets up stdout logging. `RUST_LOG` takes precedence over `settings.log_level`.
///
/// Returns `false` if a global subscriber was already installed (e.g. by the host
/// application); the existing one is kept.
pub fn init_logging(settings: &Settings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lca_vocab_core={}", settings.log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Plain => builder.with_ansi(false).compact().try_init(),
    };
    installed.is_ok()
}
