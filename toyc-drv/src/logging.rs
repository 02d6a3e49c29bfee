//! `tracing` subscriber setup, grounded on `faxt`'s `init_logging`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a `tracing` subscriber writing to stderr.
///
/// `verbose` widens the default filter from `info` to `debug`; it is
/// still overridden by `RUST_LOG` when that variable is set.
/// `try_init` rather than `init`: running under `cargo test`, more than
/// one test in the same binary may call this, and a second call should
/// be a no-op rather than a panic.
pub fn init_logging(verbose: bool, no_color: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt::layer().with_ansi(!no_color).with_target(false).with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}
