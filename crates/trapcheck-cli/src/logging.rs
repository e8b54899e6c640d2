//! Log setup

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flags.
///
/// Logs go to stderr so reports on stdout stay machine-readable.
pub fn init_logging(verbosity: Verbosity, use_color: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .with_target(verbosity.is_verbose())
        .compact()
        .try_init();
}
