//! Runtime errors surfaced by the processor variants.

use soc_asm::AsmError;

/// Fatal-to-the-run errors. None of these are recovered internally; a
/// failure unwinds the enclosing test bench / CLI, which logs the
/// offending opcode, PC, and operand index (spec §7) and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("isa violation: {0}")]
    IsaViolation(String),

    #[error("division by zero")]
    DivideByZero,

    #[error("register index {index} out of range for a {len}-register file")]
    RegisterOutOfRange { index: usize, len: usize },

    #[error("doorbell rang while a program is still running (pc != 0)")]
    DoorbellBusy,

    #[error("stage buffer contract violated: {0}")]
    StageBufferContract(&'static str),
}

impl From<AsmError> for CoreError {
    fn from(error: AsmError) -> Self {
        Self::IsaViolation(error.to_string())
    }
}
