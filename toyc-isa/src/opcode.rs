//! The instruction set's opcode numbering (bits 0-15 of a word).

use std::fmt;

/// Every operation the virtual machine understands, numbered in
/// declaration order. The values are part of the wire format shared by
/// `toyc-gen` (which only ever writes them) and `toyc-vm` (which only
/// ever reads them) — do not renumber without updating both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    Lea = 1,
    Jmp = 2,
    Call = 3,
    Jz = 4,
    Jnz = 5,
    Li = 6,
    Si = 7,
    Lid = 8,
    Sid = 9,
    Push = 10,
    Pop = 11,
    Ret = 12,
    Orb = 13,
    Xorb = 14,
    Andb = 15,
    Eq = 16,
    Ne = 17,
    Lt = 18,
    Le = 19,
    Gt = 20,
    Ge = 21,
    Shl = 22,
    Shr = 23,
    Add = 24,
    Sub = 25,
    Mul = 26,
    Div = 27,
    Mod = 28,
    Notb = 29,
    Inpt = 30,
    Outpt = 31,
    Iexit = 32,
}

impl Opcode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        use Opcode::*;
        Some(match value {
            1 => Lea,
            2 => Jmp,
            3 => Call,
            4 => Jz,
            5 => Jnz,
            6 => Li,
            7 => Si,
            8 => Lid,
            9 => Sid,
            10 => Push,
            11 => Pop,
            12 => Ret,
            13 => Orb,
            14 => Xorb,
            15 => Andb,
            16 => Eq,
            17 => Ne,
            18 => Lt,
            19 => Le,
            20 => Gt,
            21 => Ge,
            22 => Shl,
            23 => Shr,
            24 => Add,
            25 => Sub,
            26 => Mul,
            27 => Div,
            28 => Mod,
            29 => Notb,
            30 => Inpt,
            31 => Outpt,
            32 => Iexit,
            _ => return None,
        })
    }

    /// The mnemonic used by `--dump-assembly` output.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Lea => "lea",
            Opcode::Jmp => "jmp",
            Opcode::Call => "call",
            Opcode::Jz => "jz",
            Opcode::Jnz => "jnz",
            Opcode::Li => "li",
            Opcode::Si => "si",
            Opcode::Lid => "lid",
            Opcode::Sid => "sid",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Ret => "ret",
            Opcode::Orb => "orb",
            Opcode::Xorb => "xorb",
            Opcode::Andb => "andb",
            Opcode::Eq => "eq",
            Opcode::Ne => "ne",
            Opcode::Lt => "lt",
            Opcode::Le => "le",
            Opcode::Gt => "gt",
            Opcode::Ge => "ge",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::Notb => "notb",
            Opcode::Inpt => "inpt",
            Opcode::Outpt => "outpt",
            Opcode::Iexit => "iexit",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u16() {
        for value in 1..=32u16 {
            let op = Opcode::from_u16(value).unwrap();
            assert_eq!(op.as_u16(), value);
        }
    }

    #[test]
    fn unknown_value_is_none() {
        assert_eq!(Opcode::from_u16(0), None);
        assert_eq!(Opcode::from_u16(33), None);
    }
}
