//! The destination and computed value an instruction writes back.
//!
//! Named `Outcome` rather than `Result` (the name spec.md uses) to avoid
//! shadowing `std::result::Result` everywhere this type is in scope.

use crate::flags::Flags;
use soc_types::{Address, RegisterIndex, Word};

/// Where an `Outcome` commits its value, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResultType {
    None,
    Register,
    Memory,
}

/// Destination location, tagged by [`ResultType`]: a register index or a
/// memory address. `Unused` backs `ResultType::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Destination {
    Unused,
    Register(RegisterIndex),
    Memory(Address),
}

/// The result of executing an instruction: where it goes, what value, and
/// the flags snapshot produced alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub destination: Destination,
    pub value: Word,
    pub flags: Flags,
}

impl Outcome {
    pub const fn none() -> Self {
        Self { destination: Destination::Unused, value: 0, flags: Flags {
            sign: false, zero: false, parity: false, carry: false,
        } }
    }

    pub const fn result_type(&self) -> ResultType {
        match self.destination {
            Destination::Unused => ResultType::None,
            Destination::Register(_) => ResultType::Register,
            Destination::Memory(_) => ResultType::Memory,
        }
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::none()
    }
}
