//! Errors raised while decoding an instruction word.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IsaError {
    #[error("unknown opcode {0}")]
    UnknownOpcode(u16),
    #[error("invalid register byte {0}")]
    InvalidRegister(u8),
}

pub type IsaResult<T> = Result<T, IsaError>;
