//! `--dump-assembly` rendering: the linked text segment as
//! `addr<TAB>mnemonic operands` lines, one per cell, stopping at the
//! first all-zero cell — the same shape as the original interpreter's
//! `print_text`.

use toyc_isa::Instruction;

/// Renders `text` starting at cell 0. A zero cell ends the listing (the
/// tail of the segment beyond the generated program is never touched).
/// A word that fails to decode ends the listing with a diagnostic line
/// instead of panicking — this is a display helper, not part of
/// execution, so it never returns a [`crate::VmError`].
pub fn disassemble(text: &[u64]) -> Vec<String> {
    let mut lines = Vec::new();
    for (addr, &word) in text.iter().enumerate() {
        if word == 0 {
            break;
        }
        match Instruction::from_word(word) {
            Ok(instr) => lines.push(format!("{addr}\t{instr}")),
            Err(_) => {
                lines.push(format!("{addr}\tunknown instruction word {word}"));
                break;
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use toyc_isa::{Instruction, Register};

    #[test]
    fn stops_at_first_zero_cell() {
        let text = vec![Instruction::Iexit.to_word(), 0, Instruction::Iexit.to_word()];
        let lines = disassemble(&text);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "0\tiexit");
    }

    #[test]
    fn formats_operands_like_the_original_printer() {
        let text = vec![Instruction::Lea {
            reg0: Register::Rax,
            reg1: Register::Rbp,
            imm: -2,
        }
        .to_word()];
        let lines = disassemble(&text);
        assert_eq!(lines[0], "0\tlea rax, rbp, -2");
    }

    #[test]
    fn empty_text_yields_no_lines() {
        assert!(disassemble(&[]).is_empty());
    }
}
