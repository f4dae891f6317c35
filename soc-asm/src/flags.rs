//! Condition flags produced by ALU opcodes.

/// The processor's condition register. All four fields are booleans;
/// `COMPARE` only ever touches `zero`/`carry` (see `soc_core::execute`),
/// every other ALU opcode sets all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags {
    pub sign: bool,
    pub zero: bool,
    pub parity: bool,
    pub carry: bool,
}
