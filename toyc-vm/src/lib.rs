//! The virtual machine: fetch-decode-dispatch execution of a linked text
//! segment over a Harvard-style text/stack/data memory model.
//!
//! `toyc-gen` only ever builds instruction words; this crate only ever
//! decodes and executes them. Neither depends on the other — both
//! depend on `toyc-isa` for the shared wire format.

mod disassembler;
mod error;
mod machine;

pub use disassembler::disassemble;
pub use error::{Segment, VmError, VmResult};
pub use machine::VirtualMachine;
