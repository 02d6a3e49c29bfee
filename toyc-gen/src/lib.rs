//! The code generator: a single recursive walk over a resolved
//! [`toyc_par::Program`] that emits a flat instruction stream into a
//! growable text buffer, followed by a link pass that rewrites call
//! placeholders into concrete `call`/builtin opcodes.

mod error;
mod generator;

pub use error::{CodegenError, CodegenResult};
pub use generator::{generate, LinkedProgram};
