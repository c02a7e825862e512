//! Log output for the tabhost binary.

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// Safe to call more than once; later calls are ignored so tests can
/// initialise logging freely.
pub fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .try_init();
}
