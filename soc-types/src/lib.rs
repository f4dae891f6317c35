//! Atomic types shared across the SoC simulator crates.
//!
//! Memory is word-addressed: one [`Address`] unit names one [`Word`], and
//! every `Word` is a 64-bit quantity wide enough to hold either an address
//! or a signed arithmetic operand.

#![forbid(unsafe_code)]

/// A memory address. Memory is word-addressed, so incrementing an `Address`
/// by one moves to the next instruction or data word, never a sub-word byte.
pub type Address = u64;

/// A single 64-bit memory word. Arithmetic opcodes interpret a `Word`'s bits
/// as a signed `i64`; everywhere else it is treated as an opaque bit pattern.
pub type Word = u64;

/// Index into the register file. Distinct from `usize` so call sites read as
/// "register number" rather than an arbitrary array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterIndex(pub u8);

impl RegisterIndex {
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for RegisterIndex {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for RegisterIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "R{}", self.0)
    }
}
