//! Diagnostic code catalog: a short prefix plus a number, e.g. `E1001`.
//!
//! Codes are grouped by the phase that raises them: `E1xxx` lexical,
//! `E2xxx` parse, `E3xxx` resolve, `E4xxx` codegen, `E5xxx` runtime;
//! `W3xxx` are resolve-phase warnings.

use std::fmt;

/// A diagnostic code: a prefix (`"E"`/`"W"`) and a four-digit number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    prefix: &'static str,
    number: u32,
}

impl DiagnosticCode {
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    pub fn as_str(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }

    // Lexical errors.
    #[allow(non_upper_case_globals)]
    pub const E1001_UNKNOWN_OPERATOR: DiagnosticCode = DiagnosticCode::new("E", 1001);
    #[allow(non_upper_case_globals)]
    pub const E1002_MALFORMED_NUMBER: DiagnosticCode = DiagnosticCode::new("E", 1002);

    // Parse errors.
    #[allow(non_upper_case_globals)]
    pub const E2001_TOKEN_MISMATCH: DiagnosticCode = DiagnosticCode::new("E", 2001);
    #[allow(non_upper_case_globals)]
    pub const E2002_EXPECTED_TERM: DiagnosticCode = DiagnosticCode::new("E", 2002);
    #[allow(non_upper_case_globals)]
    pub const E2003_UNRECOGNIZED_TYPE: DiagnosticCode = DiagnosticCode::new("E", 2003);

    // Resolve errors.
    #[allow(non_upper_case_globals)]
    pub const E3001_FUNCTION_REDEFINITION: DiagnosticCode = DiagnosticCode::new("E", 3001);
    #[allow(non_upper_case_globals)]
    pub const E3002_VARIABLE_REDEFINITION: DiagnosticCode = DiagnosticCode::new("E", 3002);
    #[allow(non_upper_case_globals)]
    pub const E3003_UNDEFINED_VARIABLE: DiagnosticCode = DiagnosticCode::new("E", 3003);
    #[allow(non_upper_case_globals)]
    pub const E3004_UNDEFINED_FUNCTION: DiagnosticCode = DiagnosticCode::new("E", 3004);
    #[allow(non_upper_case_globals)]
    pub const E3005_ARITY_MISMATCH: DiagnosticCode = DiagnosticCode::new("E", 3005);
    #[allow(non_upper_case_globals)]
    pub const E3006_UNKNOWN_ARGUMENT: DiagnosticCode = DiagnosticCode::new("E", 3006);
    #[allow(non_upper_case_globals)]
    pub const W3001_UNUSED_VARIABLE: DiagnosticCode = DiagnosticCode::new("W", 3001);
    #[allow(non_upper_case_globals)]
    pub const W3002_UNUSED_FUNCTION: DiagnosticCode = DiagnosticCode::new("W", 3002);

    // Codegen errors.
    #[allow(non_upper_case_globals)]
    pub const E4001_RVALUE_ASSIGNMENT: DiagnosticCode = DiagnosticCode::new("E", 4001);
    #[allow(non_upper_case_globals)]
    pub const E4002_UNDEFINED_SYMBOL: DiagnosticCode = DiagnosticCode::new("E", 4002);
    #[allow(non_upper_case_globals)]
    pub const E4003_SEGMENT_OVERFLOW: DiagnosticCode = DiagnosticCode::new("E", 4003);

    // Runtime errors.
    #[allow(non_upper_case_globals)]
    pub const E5001_UNKNOWN_OPCODE: DiagnosticCode = DiagnosticCode::new("E", 5001);
    #[allow(non_upper_case_globals)]
    pub const E5002_DIVISION_BY_ZERO: DiagnosticCode = DiagnosticCode::new("E", 5002);
    #[allow(non_upper_case_globals)]
    pub const E5003_SEGMENT_OVERFLOW: DiagnosticCode = DiagnosticCode::new("E", 5003);
    #[allow(non_upper_case_globals)]
    pub const E5004_INVALID_REGISTER: DiagnosticCode = DiagnosticCode::new("E", 5004);
    #[allow(non_upper_case_globals)]
    pub const E5005_IO_ERROR: DiagnosticCode = DiagnosticCode::new("E", 5005);
    #[allow(non_upper_case_globals)]
    pub const E5006_MALFORMED_INPUT: DiagnosticCode = DiagnosticCode::new("E", 5006);
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_four_digit_number() {
        assert_eq!(DiagnosticCode::E1001_UNKNOWN_OPERATOR.as_str(), "E1001");
        assert_eq!(DiagnosticCode::W3001_UNUSED_VARIABLE.as_str(), "W3001");
    }
}
