//! The register file and the fetch-decode-dispatch loop.

use std::io::{BufRead, Write};

use toyc_isa::{Instruction, Register, SEGMENT_SIZE};

use crate::error::{Segment, VmError, VmResult};

#[derive(Debug, Default, Clone, Copy)]
struct Registers {
    rax: i64,
    rip: i64,
    rbp: i64,
    rsp: i64,
}

/// A Harvard-architecture interpreter: three fixed-size `i64` segments
/// (`text`, `stack`, `data`) and the five registers of §3. Built once
/// per run from a [`toyc_gen::LinkedProgram`]'s `text`/`data_len`.
pub struct VirtualMachine {
    text: Vec<u64>,
    stack: Vec<i64>,
    data: Vec<i64>,
    regs: Registers,
    trace: bool,
}

fn in_bounds(segment: Segment, index: i64) -> VmResult<usize> {
    if index < 0 || index as usize >= SEGMENT_SIZE {
        return Err(VmError::SegmentOverflow { segment, index });
    }
    Ok(index as usize)
}

impl VirtualMachine {
    /// Builds a VM with `text` copied into a zero-padded
    /// `SEGMENT_SIZE`-cell text segment, and zeroed `stack`/`data`
    /// segments of the same size. `data_len` is accepted for symmetry
    /// with [`toyc_gen::LinkedProgram`] but needs no special handling:
    /// every data cell starts at zero regardless of how many of them a
    /// program actually uses.
    pub fn new(text: Vec<u64>, _data_len: usize) -> Self {
        let mut padded = text;
        padded.resize(SEGMENT_SIZE, 0);
        Self {
            text: padded,
            stack: vec![0; SEGMENT_SIZE],
            data: vec![0; SEGMENT_SIZE],
            regs: Registers::default(),
            trace: false,
        }
    }

    /// Enables a `tracing::trace!` line per executed instruction.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    fn get_reg(&self, reg: Register) -> i64 {
        match reg {
            Register::Rax => self.regs.rax,
            Register::Rip => self.regs.rip,
            Register::Rbp => self.regs.rbp,
            Register::Rsp => self.regs.rsp,
            Register::Rzero => 0,
        }
    }

    fn set_reg(&mut self, reg: Register, value: i64) {
        match reg {
            Register::Rax => self.regs.rax = value,
            Register::Rip => self.regs.rip = value,
            Register::Rbp => self.regs.rbp = value,
            Register::Rsp => self.regs.rsp = value,
            Register::Rzero => {}
        }
    }

    fn read_stack(&self, index: i64) -> VmResult<i64> {
        Ok(self.stack[in_bounds(Segment::Stack, index)?])
    }

    fn write_stack(&mut self, index: i64, value: i64) -> VmResult<()> {
        let idx = in_bounds(Segment::Stack, index)?;
        self.stack[idx] = value;
        Ok(())
    }

    fn read_data(&self, index: i64) -> VmResult<i64> {
        Ok(self.data[in_bounds(Segment::Data, index)?])
    }

    fn write_data(&mut self, index: i64, value: i64) -> VmResult<()> {
        let idx = in_bounds(Segment::Data, index)?;
        self.data[idx] = value;
        Ok(())
    }

    fn push(&mut self, value: i64) -> VmResult<()> {
        self.write_stack(self.regs.rsp, value)?;
        self.regs.rsp += 1;
        Ok(())
    }

    fn pop(&mut self) -> VmResult<i64> {
        self.regs.rsp -= 1;
        self.read_stack(self.regs.rsp)
    }

    fn fetch(&mut self) -> VmResult<u64> {
        let idx = in_bounds(Segment::Text, self.regs.rip)?;
        let word = self.text[idx];
        self.regs.rip += 1;
        Ok(word)
    }

    fn binary_op(&mut self, f: impl FnOnce(i64, i64) -> i64) -> VmResult<()> {
        let operand0 = self.pop()?;
        self.regs.rax = f(operand0, self.regs.rax);
        Ok(())
    }

    fn compare(&mut self, f: impl FnOnce(i64, i64) -> bool) -> VmResult<()> {
        let operand0 = self.pop()?;
        self.regs.rax = f(operand0, self.regs.rax) as i64;
        Ok(())
    }

    /// Runs until `iexit` or a fatal error. `stdin`/`stdout` back
    /// `inpt`/`outpt`; tests pass an in-memory cursor/buffer instead of
    /// the process's real standard streams.
    pub fn run(&mut self, stdin: &mut impl BufRead, stdout: &mut impl Write) -> VmResult<()> {
        loop {
            let instr_rip = self.regs.rip;
            let word = self.fetch()?;
            let instr = Instruction::from_word(word).map_err(|e| to_vm_error(e, instr_rip))?;
            if self.trace {
                tracing::trace!(rip = instr_rip, %instr, "executing");
            }
            match instr {
                Instruction::Lea { reg0, reg1, imm } => {
                    let value = self.get_reg(reg1) + imm as i64;
                    self.set_reg(reg0, value);
                }
                Instruction::Jmp { imm } => self.regs.rip = imm as i64,
                Instruction::Jz { imm } => {
                    if self.regs.rax == 0 {
                        self.regs.rip = imm as i64;
                    }
                }
                Instruction::Jnz { imm } => {
                    if self.regs.rax != 0 {
                        self.regs.rip = imm as i64;
                    }
                }
                Instruction::Call { imm } => {
                    self.push(self.regs.rip)?;
                    self.regs.rip = imm as i64;
                }
                Instruction::Ret => {
                    self.regs.rip = self.pop()?;
                }
                Instruction::Push { reg } => {
                    let value = self.get_reg(reg);
                    self.push(value)?;
                }
                Instruction::Pop { reg } => {
                    let value = self.pop()?;
                    self.set_reg(reg, value);
                }
                Instruction::Li => {
                    let addr = self.pop()?;
                    self.regs.rax = self.read_stack(addr)?;
                }
                Instruction::Si => {
                    let addr = self.pop()?;
                    self.write_stack(addr, self.regs.rax)?;
                }
                Instruction::Lid => {
                    let addr = self.pop()?;
                    self.regs.rax = self.read_data(addr)?;
                }
                Instruction::Sid => {
                    let addr = self.pop()?;
                    self.write_data(addr, self.regs.rax)?;
                }
                Instruction::Orb => self.binary_op(|a, b| a | b)?,
                Instruction::Xorb => self.binary_op(|a, b| a ^ b)?,
                Instruction::Andb => self.binary_op(|a, b| a & b)?,
                Instruction::Eq => self.compare(|a, b| a == b)?,
                Instruction::Ne => self.compare(|a, b| a != b)?,
                Instruction::Lt => self.compare(|a, b| a < b)?,
                Instruction::Le => self.compare(|a, b| a <= b)?,
                Instruction::Gt => self.compare(|a, b| a > b)?,
                Instruction::Ge => self.compare(|a, b| a >= b)?,
                Instruction::Shl => self.binary_op(|a, b| a.wrapping_shl((b & 63) as u32))?,
                Instruction::Shr => self.binary_op(|a, b| a.wrapping_shr((b & 63) as u32))?,
                Instruction::Add => self.binary_op(i64::wrapping_add)?,
                Instruction::Sub => self.binary_op(i64::wrapping_sub)?,
                Instruction::Mul => self.binary_op(i64::wrapping_mul)?,
                Instruction::Div => {
                    let operand0 = self.pop()?;
                    if self.regs.rax == 0 {
                        return Err(VmError::DivisionByZero { rip: instr_rip });
                    }
                    self.regs.rax = operand0.wrapping_div(self.regs.rax);
                }
                Instruction::Mod => {
                    let operand0 = self.pop()?;
                    if self.regs.rax == 0 {
                        return Err(VmError::DivisionByZero { rip: instr_rip });
                    }
                    self.regs.rax = operand0.wrapping_rem(self.regs.rax);
                }
                Instruction::Notb => {
                    let operand0 = self.pop()?;
                    self.regs.rax = !operand0;
                }
                Instruction::Inpt => {
                    self.regs.rax = read_input_line(stdin)?;
                }
                Instruction::Outpt => {
                    let value = self.read_stack(self.regs.rsp - 1)?;
                    writeln!(stdout, "{value}").map_err(|e| VmError::Io(e.to_string()))?;
                }
                Instruction::Iexit => {
                    writeln!(stdout, "program exited").map_err(|e| VmError::Io(e.to_string()))?;
                    return Ok(());
                }
            }
        }
    }
}

fn to_vm_error(err: toyc_isa::IsaError, rip: i64) -> VmError {
    match err {
        toyc_isa::IsaError::UnknownOpcode(opcode) => VmError::UnknownOpcode { opcode, rip },
        toyc_isa::IsaError::InvalidRegister(byte) => VmError::InvalidRegister { byte, rip },
    }
}

fn read_input_line(stdin: &mut impl BufRead) -> VmResult<i64> {
    let mut line = String::new();
    let read = stdin.read_line(&mut line).map_err(|e| VmError::Io(e.to_string()))?;
    if read == 0 {
        return Err(VmError::MalformedInput(String::new()));
    }
    line.trim()
        .parse::<i64>()
        .map_err(|_| VmError::MalformedInput(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use toyc_isa::Register;

    fn run(text: Vec<u64>, input: &str) -> (VirtualMachine, String) {
        let mut vm = VirtualMachine::new(text, 0);
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let mut stdout = Vec::new();
        vm.run(&mut stdin, &mut stdout).unwrap();
        (vm, String::from_utf8(stdout).unwrap())
    }

    #[test]
    fn literal_and_exit_reports_exit_message() {
        let text = vec![
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: 42,
            }
            .to_word(),
            Instruction::Iexit.to_word(),
        ];
        let (vm, out) = run(text, "");
        assert_eq!(vm.regs.rax, 42);
        assert_eq!(out, "program exited\n");
    }

    #[test]
    fn outpt_prints_stack_top_without_popping() {
        let text = vec![
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: 7,
            }
            .to_word(),
            Instruction::Push { reg: Register::Rax }.to_word(),
            Instruction::Outpt.to_word(),
            Instruction::Iexit.to_word(),
        ];
        let (vm, out) = run(text, "");
        assert_eq!(out, "7\nprogram exited\n");
        assert_eq!(vm.regs.rsp, 1, "outpt must not pop");
    }

    #[test]
    fn precedence_example_evaluates_to_37() {
        // 0x1F + 0b11 * 2
        let text = vec![
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: 0x1F,
            }
            .to_word(),
            Instruction::Push { reg: Register::Rax }.to_word(),
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: 0b11,
            }
            .to_word(),
            Instruction::Push { reg: Register::Rax }.to_word(),
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: 2,
            }
            .to_word(),
            Instruction::Mul.to_word(),
            Instruction::Add.to_word(),
            Instruction::Iexit.to_word(),
        ];
        let (vm, _) = run(text, "");
        assert_eq!(vm.regs.rax, 37);
    }

    #[test]
    fn division_by_zero_halts_with_fatal_error() {
        let text = vec![
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: 1,
            }
            .to_word(),
            Instruction::Push { reg: Register::Rax }.to_word(),
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: 0,
            }
            .to_word(),
            Instruction::Div.to_word(),
        ];
        let mut vm = VirtualMachine::new(text, 0);
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let err = vm.run(&mut stdin, &mut stdout).unwrap_err();
        assert!(matches!(err, VmError::DivisionByZero { .. }));
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        let text = vec![0xFFFFu64];
        let mut vm = VirtualMachine::new(text, 0);
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let err = vm.run(&mut stdin, &mut stdout).unwrap_err();
        assert!(matches!(err, VmError::UnknownOpcode { .. }));
    }

    #[test]
    fn call_and_ret_restore_rip_across_the_call() {
        // call 3; iexit; <unreached>; ret (callee at address 3)
        let text = vec![
            Instruction::Call { imm: 3 }.to_word(),
            Instruction::Iexit.to_word(),
            0, // padding so the callee sits at a distinct address
            Instruction::Ret.to_word(),
        ];
        let (_vm, out) = run(text, "");
        assert_eq!(out, "program exited\n");
    }

    #[test]
    fn inpt_reads_a_line_into_rax() {
        let text = vec![Instruction::Inpt.to_word(), Instruction::Iexit.to_word()];
        let (vm, _) = run(text, "123\n");
        assert_eq!(vm.regs.rax, 123);
    }

    #[test]
    fn malformed_input_is_a_fatal_error_not_a_panic() {
        let text = vec![Instruction::Inpt.to_word()];
        let mut vm = VirtualMachine::new(text, 0);
        let mut stdin = Cursor::new(b"not a number\n".to_vec());
        let mut stdout = Vec::new();
        let err = vm.run(&mut stdin, &mut stdout).unwrap_err();
        assert!(matches!(err, VmError::MalformedInput(_)));
    }

    #[test]
    fn out_of_bounds_stack_address_is_reported() {
        // push an address past the segment, then li through it.
        let text = vec![
            Instruction::Lea {
                reg0: Register::Rax,
                reg1: Register::Rzero,
                imm: SEGMENT_SIZE as i32,
            }
            .to_word(),
            Instruction::Push { reg: Register::Rax }.to_word(),
            Instruction::Li.to_word(),
        ];
        let mut vm = VirtualMachine::new(text, 0);
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let err = vm.run(&mut stdin, &mut stdout).unwrap_err();
        assert!(matches!(
            err,
            VmError::SegmentOverflow {
                segment: Segment::Stack,
                ..
            }
        ));
    }

    #[quickcheck_macros::quickcheck]
    fn add_wraps_instead_of_panicking(a: i64, b: i64) -> bool {
        let mut vm = VirtualMachine::new(Vec::new(), 0);
        vm.push(a).unwrap();
        vm.regs.rax = b;
        vm.binary_op(i64::wrapping_add).unwrap();
        vm.regs.rax == a.wrapping_add(b)
    }

    #[quickcheck_macros::quickcheck]
    fn push_then_pop_round_trips(value: i64) -> bool {
        let mut vm = VirtualMachine::new(Vec::new(), 0);
        vm.push(value).unwrap();
        vm.pop().unwrap() == value
    }
}
