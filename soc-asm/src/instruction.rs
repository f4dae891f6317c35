//! The in-flight instruction record that flows through a processor.

use crate::error::AsmError;
use crate::isa::{details, Opcode};
use crate::operand::{Operand, OperandStatus};
use crate::outcome::Outcome;

/// A decoded instruction, mutated in place as operands are gathered and it
/// is executed.
///
/// Unlike the C++ original this was distilled from, there is no `phase`
/// field: which stage buffer (or lack of one, for the simpler processor
/// variants) holds an `Instruction` already tells you its phase, so a
/// parallel enum would only be able to drift out of sync with reality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    /// Words this instruction occupies in memory: `1 + count(Constant operands)`.
    pub size: u8,
    pub result: Outcome,
}

impl Instruction {
    fn with_size(opcode: Opcode, operands: Vec<Operand>, result: Outcome) -> Self {
        let size = 1 + operands
            .iter()
            .filter(|op| op.source == crate::operand::OperandType::Constant)
            .count() as u8;
        Self { opcode, operands, size, result }
    }

    /// Build an instruction, trusting the caller to supply the right number
    /// of operands for `opcode`. Used by [`crate::codec::decode`] and
    /// [`crate::image`], both of which derive the operand count from the
    /// ISA catalog themselves and so can never violate the invariant.
    /// Debug builds still assert it so a future caller that breaks the
    /// invariant fails loudly in tests rather than miscounting `size`.
    pub fn new(opcode: Opcode, operands: Vec<Operand>, result: Outcome) -> Self {
        debug_assert_eq!(operands.len(), details(opcode).num_operands as usize);
        Self::with_size(opcode, operands, result)
    }

    /// Build an instruction from untrusted operand data, rejecting a
    /// mismatched operand count with `IsaViolation` (spec §4.3/§7) instead
    /// of relying on a debug-only assertion.
    pub fn try_new(opcode: Opcode, operands: Vec<Operand>, result: Outcome) -> Result<Self, AsmError> {
        let expected = details(opcode).num_operands;
        let actual = operands.len() as u8;
        if actual != expected {
            return Err(AsmError::OperandCountMismatch { opcode, expected, actual });
        }
        Ok(Self::with_size(opcode, operands, result))
    }

    /// True once every operand has status `Gathered` — the precondition for
    /// execute per spec §4.5.
    pub fn operands_gathered(&self) -> bool {
        self.operands
            .iter()
            .all(|op| op.status == OperandStatus::Gathered)
    }
}
