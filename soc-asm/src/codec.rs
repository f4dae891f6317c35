//! Pure encode/decode between [`Instruction`] and the 64-bit wire words
//! described in spec §6.
//!
//! ```text
//! word[0]:
//!   bits [0..16)   opcode
//!   bits [16..24)  operand0 type    (2 low bits meaningful)
//!   bits [24..32)  operand1 type    (2 low bits meaningful)
//!   bits [32..40)  result   type    (bit0=REGISTER, bit1=MEMORY)
//!   bits [40..48)  operand0 meta    (register index OR 8-bit immediate)
//!   bits [48..56)  operand1 meta    (register index OR 8-bit immediate)
//!   bits [56..64)  result   meta    (destination register/address low byte)
//! word[1..k]: one word per CONSTANT-typed operand, in operand order.
//! ```

use std::convert::TryFrom;

use soc_types::{Address, RegisterIndex, Word};

use crate::error::AsmError;
use crate::instruction::Instruction;
use crate::isa::{details, Opcode};
use crate::operand::{Operand, OperandStatus, OperandType};
use crate::outcome::{Destination, Outcome};

const TYPE_REGISTER: u64 = 0b00;
const TYPE_CONSTANT: u64 = 0b01;
const TYPE_INDIRECT: u64 = 0b10;
const TYPE_EMBEDDED: u64 = 0b11;

fn operand_type_bits(source: OperandType) -> u64 {
    match source {
        OperandType::Register => TYPE_REGISTER,
        OperandType::Constant => TYPE_CONSTANT,
        OperandType::IndirectMemoryRegister => TYPE_INDIRECT,
        OperandType::Embedded => TYPE_EMBEDDED,
    }
}

fn operand_type_from_bits(bits: u64) -> OperandType {
    match bits & 0b11 {
        TYPE_REGISTER => OperandType::Register,
        TYPE_CONSTANT => OperandType::Constant,
        TYPE_INDIRECT => OperandType::IndirectMemoryRegister,
        _ => OperandType::Embedded,
    }
}

/// Encode an instruction into its header word plus one trailing word per
/// `CONSTANT` operand, in operand order.
pub fn encode(instruction: &Instruction) -> Vec<Word> {
    let mut header: u64 = instruction.opcode.value() as u64;

    for (i, operand) in instruction.operands.iter().enumerate() {
        let type_bits = operand_type_bits(operand.source);
        header |= type_bits << (16 + 8 * i);

        let meta: u64 = match operand.source {
            OperandType::Register | OperandType::IndirectMemoryRegister => {
                operand.location.0 as u64
            }
            OperandType::Constant => 0,
            OperandType::Embedded => operand.value & 0xff,
        };
        header |= meta << (40 + 8 * i);
    }

    let (result_type_bits, result_meta): (u64, u64) = match instruction.result.destination {
        Destination::Unused => (0, 0),
        Destination::Register(r) => (0b01, r.0 as u64),
        Destination::Memory(addr) => (0b10, addr & 0xff),
    };
    header |= result_type_bits << 32;
    header |= result_meta << 56;

    let mut words = vec![header];
    for operand in &instruction.operands {
        if operand.source == OperandType::Constant {
            words.push(operand.value);
        }
    }
    words
}

/// Decode a single fetched word into a partially-filled [`Instruction`].
///
/// `CONSTANT` operands come back with `status = Decoded` and no value —
/// `gather_operands` is what turns them into memory reads.
pub fn decode(word: Word) -> Result<Instruction, AsmError> {
    let opcode = Opcode::try_from((word & 0xffff) as u16)?;
    let num_operands = details(opcode).num_operands;

    let mut operands = Vec::with_capacity(num_operands as usize);
    for i in 0..num_operands as usize {
        let type_bits = (word >> (16 + 8 * i)) & 0b11;
        let meta = (word >> (40 + 8 * i)) & 0xff;
        let source = operand_type_from_bits(type_bits);

        let operand = match source {
            OperandType::Register => Operand::register(RegisterIndex(meta as u8)),
            OperandType::Constant => Operand::constant(),
            OperandType::IndirectMemoryRegister => Operand::indirect(RegisterIndex(meta as u8)),
            OperandType::Embedded => Operand::embedded(meta),
        };
        operands.push(operand);
    }
    debug_assert!(operands.iter().all(|op| {
        op.status == OperandStatus::Decoded || op.status == OperandStatus::Gathered
    }));

    let result_type_bits = (word >> 32) & 0xff;
    let result_meta = (word >> 56) & 0xff;
    let destination = if result_type_bits & 0b01 != 0 {
        Destination::Register(RegisterIndex(result_meta as u8))
    } else if result_type_bits & 0b10 != 0 {
        Destination::Memory(result_meta as Address)
    } else {
        Destination::Unused
    };

    Ok(Instruction::new(
        opcode,
        operands,
        Outcome { destination, value: 0, flags: Default::default() },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;

    fn add_embedded_to_memory() -> Instruction {
        Instruction::new(
            Opcode::Add,
            vec![Operand::embedded(2), Operand::embedded(3)],
            Outcome { destination: Destination::Memory(2), value: 0, flags: Default::default() },
        )
    }

    #[test]
    fn round_trips_opcode_operand_types_and_embedded_values() {
        let instruction = add_embedded_to_memory();
        let words = encode(&instruction);
        let decoded = decode(words[0]).unwrap();

        assert_eq!(decoded.opcode, instruction.opcode);
        assert_eq!(decoded.operands.len(), instruction.operands.len());
        for (got, want) in decoded.operands.iter().zip(&instruction.operands) {
            assert_eq!(got.source, want.source);
            assert_eq!(got.location, want.location);
            if want.source == OperandType::Embedded {
                assert_eq!(got.value, want.value);
            }
        }
        assert_eq!(decoded.result.destination, instruction.result.destination);
    }

    #[test]
    fn constant_operands_append_one_trailing_word_each_in_order() {
        let instruction = Instruction::new(
            Opcode::Add,
            vec![Operand::constant(), Operand::constant()],
            Outcome::none(),
        );
        let mut with_values = instruction.clone();
        with_values.operands[0].value = 111;
        with_values.operands[1].value = 222;

        let words = encode(&with_values);
        assert_eq!(words.len(), 3);
        assert_eq!(words[1], 111);
        assert_eq!(words[2], 222);
    }

    #[test]
    fn decode_rejects_unknown_opcode() {
        assert!(matches!(decode(0xbeef), Err(AsmError::UnknownOpcode(0xbeef))));
    }

    #[test]
    fn register_operand_round_trips_location() {
        let instruction = Instruction::new(
            Opcode::Increment,
            vec![Operand::register(RegisterIndex(5))],
            Outcome { destination: Destination::Register(RegisterIndex(5)), value: 0, flags: Default::default() },
        );
        let words = encode(&instruction);
        let decoded = decode(words[0]).unwrap();
        assert_eq!(decoded.operands[0].location, RegisterIndex(5));
        assert_eq!(decoded.result.destination, Destination::Register(RegisterIndex(5)));
    }
}
