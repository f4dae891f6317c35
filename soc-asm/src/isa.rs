//! The instruction set catalog: every opcode, its execution class, and how
//! many operand slots it declares.
//!
//! The catalog is computed at compile time as a `const fn` match rather than
//! a lazily-initialized global table — there's a fixed, known set of opcodes,
//! so there's nothing to defer.

use crate::error::AsmError;
use std::convert::TryFrom;

/// The execution unit responsible for an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpcodeClass {
    Memory,
    Alu,
    Branch,
}

/// Every opcode this processor understands.
///
/// `CALL` and `JUMP_LESS` are given distinct values here; the C++ original
/// this was distilled from assigns both the value `9`, which is a bug (see
/// DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum Opcode {
    Move = 0,
    Add = 1,
    Subtract = 2,
    Multiply = 3,
    Divide = 4,
    Increment = 5,
    Decrement = 6,
    Compare = 7,
    Jump = 8,
    JumpLess = 9,
    Call = 10,
    Return = 11,
    Endprgm = 0xffff,
}

impl Opcode {
    pub const fn value(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Opcode {
    type Error = AsmError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Move,
            1 => Self::Add,
            2 => Self::Subtract,
            3 => Self::Multiply,
            4 => Self::Divide,
            5 => Self::Increment,
            6 => Self::Decrement,
            7 => Self::Compare,
            8 => Self::Jump,
            9 => Self::JumpLess,
            10 => Self::Call,
            11 => Self::Return,
            0xffff => Self::Endprgm,
            other => return Err(AsmError::UnknownOpcode(other)),
        })
    }
}

/// Static metadata about an opcode: which unit executes it and how many
/// operand slots its encoding declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDetails {
    pub class: OpcodeClass,
    pub num_operands: u8,
}

/// Look up an opcode's class and operand count. Total over `Opcode`, so
/// there is no "unknown opcode" case here — that failure mode lives at the
/// `u16 -> Opcode` boundary in [`Opcode::try_from`].
pub const fn details(op: Opcode) -> OpcodeDetails {
    use OpcodeClass::*;
    let (class, num_operands) = match op {
        Opcode::Move => (Memory, 1),
        Opcode::Add | Opcode::Subtract | Opcode::Multiply | Opcode::Divide | Opcode::Compare => {
            (Alu, 2)
        }
        Opcode::Increment | Opcode::Decrement => (Alu, 1),
        Opcode::Jump | Opcode::JumpLess | Opcode::Call => (Branch, 1),
        Opcode::Return | Opcode::Endprgm => (Branch, 0),
    };
    OpcodeDetails { class, num_operands }
}
