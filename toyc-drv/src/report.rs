//! Maps each phase's error type onto a `(code, message, span)` triple
//! ready for [`toyc_util::Handler::error`].
//!
//! Kept as free functions rather than a trait: the four phase error
//! types live in four different crates and none of them should know
//! about `toyc_util::DiagnosticCode`, so the mapping lives here, on the
//! consuming side.

use toyc_gen::CodegenError;
use toyc_lex::LexError;
use toyc_par::ParseError;
use toyc_sem::ResolveError;
use toyc_util::DiagnosticCode;
use toyc_util::Span;
use toyc_vm::VmError;

pub fn lex(err: &LexError) -> (DiagnosticCode, String, Span) {
    let span = err.span();
    let code = match err {
        LexError::UnknownOperator { .. } => DiagnosticCode::E1001_UNKNOWN_OPERATOR,
        LexError::MalformedNumber { .. } => DiagnosticCode::E1002_MALFORMED_NUMBER,
    };
    (code, err.to_string(), span)
}

pub fn parse(err: &ParseError) -> (DiagnosticCode, String, Span) {
    match err {
        ParseError::TokenMismatch { span, .. } => (DiagnosticCode::E2001_TOKEN_MISMATCH, err.to_string(), *span),
        ParseError::ExpectedTerm { span, .. } => (DiagnosticCode::E2002_EXPECTED_TERM, err.to_string(), *span),
        ParseError::UnrecognizedType { span, .. } => {
            (DiagnosticCode::E2003_UNRECOGNIZED_TYPE, err.to_string(), *span)
        }
        ParseError::Lex(inner) => lex(inner),
    }
}

pub fn resolve(err: &ResolveError) -> (DiagnosticCode, String, Span) {
    let code = match err {
        ResolveError::FunctionRedefinition { .. } => DiagnosticCode::E3001_FUNCTION_REDEFINITION,
        ResolveError::VariableRedefinition { .. } => DiagnosticCode::E3002_VARIABLE_REDEFINITION,
        ResolveError::UndefinedVariable { .. } => DiagnosticCode::E3003_UNDEFINED_VARIABLE,
        ResolveError::UndefinedFunction { .. } => DiagnosticCode::E3004_UNDEFINED_FUNCTION,
        ResolveError::ArityMismatch { .. } => DiagnosticCode::E3005_ARITY_MISMATCH,
        ResolveError::UnknownArgument { .. } => DiagnosticCode::E3006_UNKNOWN_ARGUMENT,
    };
    (code, err.to_string(), err.span())
}

pub fn codegen(err: &CodegenError) -> (DiagnosticCode, String, Span) {
    let span = match err {
        CodegenError::RvalueAssignment { span } => *span,
        CodegenError::UndefinedSymbol { span, .. } => *span,
        CodegenError::SegmentOverflow => Span::DUMMY,
    };
    let code = match err {
        CodegenError::RvalueAssignment { .. } => DiagnosticCode::E4001_RVALUE_ASSIGNMENT,
        CodegenError::UndefinedSymbol { .. } => DiagnosticCode::E4002_UNDEFINED_SYMBOL,
        CodegenError::SegmentOverflow => DiagnosticCode::E4003_SEGMENT_OVERFLOW,
    };
    (code, err.to_string(), span)
}

/// The VM has no span of its own (it runs compiled instructions, not
/// source text), so this only picks the code; callers print it next to
/// the error's own `rip`-qualified message instead of a source snippet.
pub fn vm(err: &VmError) -> DiagnosticCode {
    match err {
        VmError::UnknownOpcode { .. } => DiagnosticCode::E5001_UNKNOWN_OPCODE,
        VmError::DivisionByZero { .. } => DiagnosticCode::E5002_DIVISION_BY_ZERO,
        VmError::SegmentOverflow { .. } => DiagnosticCode::E5003_SEGMENT_OVERFLOW,
        VmError::InvalidRegister { .. } => DiagnosticCode::E5004_INVALID_REGISTER,
        VmError::Io(_) => DiagnosticCode::E5005_IO_ERROR,
        VmError::MalformedInput(_) => DiagnosticCode::E5006_MALFORMED_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toyc_util::FileId;

    #[test]
    fn lex_malformed_number_maps_to_e1002() {
        let err = LexError::MalformedNumber { span: Span::new(0, 1, 1, 1, FileId(0)) };
        let (code, _, _) = lex(&err);
        assert_eq!(code.as_str(), "E1002");
    }

    #[test]
    fn codegen_segment_overflow_has_no_real_span() {
        let (code, _, span) = codegen(&CodegenError::SegmentOverflow);
        assert_eq!(code.as_str(), "E4003");
        assert_eq!(span, Span::DUMMY);
    }

    #[test]
    fn vm_division_by_zero_maps_to_e5002() {
        let code = vm(&VmError::DivisionByZero { rip: 3 });
        assert_eq!(code.as_str(), "E5002");
    }
}
