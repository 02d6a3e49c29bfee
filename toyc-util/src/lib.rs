//! Foundation types shared by every `toyc` crate: interned symbols,
//! source spans, diagnostics, and a typed-index vector.
//!
//! This crate carries no language-specific knowledge — it is the same
//! kind of "plumbing" layer a compiler workspace keeps at its root so
//! every phase speaks the same `Symbol`/`Span`/`Handler` vocabulary.

pub mod diagnostic;
mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticCode, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceMap, SourceMapError, Span};
pub use symbol::Symbol;
