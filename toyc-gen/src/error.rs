//! Errors raised while generating or linking instruction text.

use toyc_util::{Span, Symbol};

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The resolver should already have rejected this; kept here as a
    /// defensive check since the parser itself accepts any expression on
    /// the left of `=`.
    #[error("left-hand side of assignment must be a variable")]
    RvalueAssignment { span: Span },
    #[error("undefined symbol {name} at link time")]
    UndefinedSymbol { name: Symbol, span: Span },
    #[error("generated program exceeds the {SEGMENT_SIZE}-cell segment size")]
    SegmentOverflow,
}

use toyc_isa::SEGMENT_SIZE;

pub type CodegenResult<T> = Result<T, CodegenError>;
