//! The driver's top-level error type: everything that can prevent a
//! `toyc` invocation from starting the pipeline or reading its source.
//!
//! Errors a phase raises *while* the pipeline is running (lex through
//! VM execution) are not routed through this type — [`crate::Session`]
//! catches and renders them itself, since each needs phase-specific
//! diagnostic formatting. `DriverError` covers what's left: a bad
//! command line, or a source file that can't be read.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to read {path}: {source}")]
    ReadSource { path: PathBuf, source: std::io::Error },
    #[error("{0}")]
    Usage(String),
}
