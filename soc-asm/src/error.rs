//! Errors raised while encoding or decoding instructions.

/// Failures in the pure encode/decode layer. These never depend on runtime
/// state (registers, memory) — anything that does belongs to
/// `soc_core::CoreError` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AsmError {
    #[error("opcode value {0:#06x} does not name a known opcode")]
    UnknownOpcode(u16),

    #[error("opcode {opcode} declares {expected} operand(s), instruction has {actual}")]
    OperandCountMismatch {
        opcode: crate::isa::Opcode,
        expected: u8,
        actual: u8,
    },
}
