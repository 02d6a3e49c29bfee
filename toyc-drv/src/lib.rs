//! `toyc`: the compiler driver binary's library half.
//!
//! Owns argument parsing ([`Config`]), session orchestration
//! (`read source -> lex -> parse -> resolve -> generate -> link -> run`,
//! in [`Session`]), and the mapping from each phase's error type to a
//! rendered diagnostic.

mod config;
mod error;
mod logging;
mod report;
mod session;

pub use config::Config;
pub use error::DriverError;
pub use logging::init_logging;
pub use session::Session;

/// Parses arguments, sets up logging, and runs one session end to end.
/// Pulled out of `main.rs` so the binary itself stays a thin wrapper
/// around exit-code conversion, and so this path is exercised by
/// `tests/cli.rs` indirectly through the built binary.
pub fn run(args: impl IntoIterator<Item = String>) -> anyhow::Result<i32> {
    let config = Config::parse(args)?;
    init_logging(config.verbose, config.no_color);
    Ok(Session::new(config).run()?)
}
