//! Errors raised while executing the text segment.

use std::fmt;

use toyc_isa::SEGMENT_SIZE;

/// Which of the VM's three memory segments an out-of-bounds access hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Text,
    Stack,
    Data,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Segment::Text => "text",
            Segment::Stack => "stack",
            Segment::Data => "data",
        })
    }
}

/// A fatal runtime error. Every variant halts the dispatch loop
/// immediately; there is no recovery, matching spec.md's "no error is
/// retried" propagation policy.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    #[error("unknown opcode {opcode} at rip={rip}")]
    UnknownOpcode { opcode: u16, rip: i64 },
    #[error("invalid register byte {byte} at rip={rip}")]
    InvalidRegister { byte: u8, rip: i64 },
    #[error("division by zero at rip={rip}")]
    DivisionByZero { rip: i64 },
    #[error("{segment} segment index {index} is out of the 0..{SEGMENT_SIZE} bound")]
    SegmentOverflow { segment: Segment, index: i64 },
    #[error("malformed input line: {0:?}")]
    MalformedInput(String),
    #[error("failed to read from standard input: {0}")]
    Io(String),
}

pub type VmResult<T> = Result<T, VmError>;
