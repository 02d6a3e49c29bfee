//! The virtual machine's instruction set: opcode numbering, bit-packed
//! word encode/decode, register identifiers, and the calling-convention
//! constants shared between the code generator and the VM.
//!
//! Neither `toyc-gen` nor `toyc-vm` depends on the other; both depend on
//! this crate so the wire format between them has exactly one
//! definition.

mod calling_convention;
mod error;
mod instruction;
mod opcode;
mod register;

pub use calling_convention::{local_offset, param_offset, SEGMENT_SIZE};
pub use error::{IsaError, IsaResult};
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use register::Register;
