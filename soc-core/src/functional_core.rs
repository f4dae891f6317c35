//! The PC/registers/flags interpreter shared by every processor variant
//! (spec §4.3).
//!
//! `FunctionalCore` never touches memory directly — it produces
//! [`MemoryRequest`] records and consumes [`MemoryResponse`] records, so the
//! same core drives both the synchronous [`crate::processor::functional`]
//! oracle and the ticked [`crate::processor::pipelined`] processor.

use soc_asm::{codec, details, Destination, Instruction, OpcodeClass, OperandStatus, OperandType};
use soc_types::{Address, RegisterIndex, Word};

use crate::error::CoreError;
use crate::memory::{MemoryRequest, MemoryResponse};

#[derive(Debug)]
pub struct FunctionalCore {
    program_counter: Address,
    registers: Vec<Word>,
    flags: soc_asm::Flags,
    terminated_count: u64,
}

impl FunctionalCore {
    pub fn new(num_registers: usize) -> Self {
        assert!(num_registers >= 1, "a register file must hold at least one register");
        Self {
            program_counter: 0,
            registers: vec![0; num_registers],
            flags: Default::default(),
            terminated_count: 0,
        }
    }

    pub fn program_counter(&self) -> Address {
        self.program_counter
    }

    pub fn registers(&self) -> &[Word] {
        &self.registers
    }

    pub fn flags(&self) -> soc_asm::Flags {
        self.flags
    }

    pub fn terminated_count(&self) -> u64 {
        self.terminated_count
    }

    fn register(&self, index: RegisterIndex) -> Result<Word, CoreError> {
        self.registers.get(index.as_usize()).copied().ok_or(CoreError::RegisterOutOfRange {
            index: index.as_usize(),
            len: self.registers.len(),
        })
    }

    fn set_register(&mut self, index: RegisterIndex, value: Word) -> Result<(), CoreError> {
        let len = self.registers.len();
        self.registers
            .get_mut(index.as_usize())
            .map(|slot| *slot = value)
            .ok_or(CoreError::RegisterOutOfRange { index: index.as_usize(), len })
    }

    /// Hand the processor a program's entry point. Fails with
    /// `DoorbellBusy` if a program is already running.
    pub fn set_application_start(&mut self, address: Address) -> Result<(), CoreError> {
        if self.program_counter != 0 {
            tracing::error!(pc = self.program_counter, requested = address, "doorbell rang while busy");
            return Err(CoreError::DoorbellBusy);
        }
        tracing::info!(address, "doorbell: starting application");
        self.program_counter = address;
        Ok(())
    }

    /// Request the instruction word at the current PC. Does not advance PC.
    pub fn fetch(&self) -> MemoryRequest {
        tracing::debug!(pc = self.program_counter, "fetching instruction");
        MemoryRequest::read(self.program_counter, 1)
    }

    /// Decode a fetched word. Does not touch PC.
    pub fn decode(&self, response: &MemoryResponse) -> Result<Instruction, CoreError> {
        let word = response.data.first().copied().unwrap_or(0);
        codec::decode(word).map_err(|error| {
            tracing::error!(pc = self.program_counter, word, %error, "decode failed");
            CoreError::from(error)
        })
    }

    /// Advance PC past the instruction word, then resolve each operand:
    /// registers are read immediately, constants and indirect reads become
    /// memory requests in operand order.
    pub fn gather_operands(&mut self, instruction: &mut Instruction) -> Result<Vec<MemoryRequest>, CoreError> {
        self.program_counter += 1;
        let mut requests = Vec::new();
        for (index, operand) in instruction.operands.iter_mut().enumerate() {
            match operand.source {
                OperandType::Register => {
                    operand.value = self.register(operand.location).map_err(|error| {
                        self.log_operand_failure(instruction.opcode, index, &error);
                        error
                    })?;
                    operand.status = OperandStatus::Gathered;
                }
                OperandType::Constant => {
                    operand.status = OperandStatus::Requested;
                    requests.push(MemoryRequest::read(self.program_counter, 1));
                    self.program_counter += 1;
                }
                OperandType::IndirectMemoryRegister => {
                    operand.status = OperandStatus::Requested;
                    let base = self.register(operand.location).map_err(|error| {
                        self.log_operand_failure(instruction.opcode, index, &error);
                        error
                    })?;
                    requests.push(MemoryRequest::read(base, 1));
                }
                OperandType::Embedded => {
                    debug_assert_eq!(operand.status, OperandStatus::Gathered);
                }
            }
        }
        Ok(requests)
    }

    /// Spec §7's "user-visible behavior": identify the offending opcode,
    /// PC, and operand index in the log line for a failed gather/execute.
    fn log_operand_failure(&self, opcode: soc_asm::Opcode, operand_index: usize, error: &CoreError) {
        tracing::error!(
            pc = self.program_counter,
            %opcode,
            operand_index,
            %error,
            "operand resolution failed"
        );
    }

    /// Fill in `Requested` operands, left to right, from `responses` in
    /// order. Safe to call repeatedly with partial response batches.
    pub fn process_operand_responses(
        &self,
        instruction: &mut Instruction,
        responses: impl IntoIterator<Item = MemoryResponse>,
    ) {
        for response in responses {
            if let Some(operand) = instruction
                .operands
                .iter_mut()
                .find(|op| op.status == OperandStatus::Requested)
            {
                operand.value = response.data.first().copied().unwrap_or(0);
                operand.status = OperandStatus::Gathered;
            }
        }
    }

    /// Execute a fully-gathered instruction, filling in `instruction.result`.
    pub fn execute(&mut self, instruction: &mut Instruction) -> Result<(), CoreError> {
        debug_assert!(instruction.operands_gathered());
        let opcode = instruction.opcode;
        let result = match details(opcode).class {
            OpcodeClass::Memory => {
                self.execute_memory(instruction);
                Ok(())
            }
            OpcodeClass::Alu => self.execute_alu(instruction).map(|()| {
                self.flags = instruction.result.flags;
            }),
            OpcodeClass::Branch => self.execute_branch(instruction),
        };
        match result {
            Ok(()) => {
                tracing::debug!(opcode = %opcode, pc = self.program_counter, "executed");
                Ok(())
            }
            Err(error) => {
                tracing::error!(pc = self.program_counter, %opcode, %error, "execute failed");
                Err(error)
            }
        }
    }

    fn execute_memory(&mut self, instruction: &mut Instruction) {
        use soc_asm::Opcode::*;
        match instruction.opcode {
            Move => instruction.result.value = instruction.operands[0].value,
            other => unreachable!("opcode {other} is not a memory opcode"),
        }
    }

    fn execute_alu(&mut self, instruction: &mut Instruction) -> Result<(), CoreError> {
        use soc_asm::Opcode::*;
        let a = instruction.operands[0].value as i64;
        let result = &mut instruction.result;

        match instruction.opcode {
            Add => {
                let b = instruction.operands[1].value as i64;
                let (value, carry) = a.overflowing_add(b);
                result.value = value as u64;
                result.flags.carry = carry;
            }
            Subtract => {
                let b = instruction.operands[1].value as i64;
                let (value, carry) = a.overflowing_sub(b);
                result.value = value as u64;
                result.flags.carry = carry;
            }
            Multiply => {
                let b = instruction.operands[1].value as i64;
                let (value, carry) = a.overflowing_mul(b);
                result.value = value as u64;
                result.flags.carry = carry;
            }
            Divide => {
                let b = instruction.operands[1].value as i64;
                if b == 0 {
                    return Err(CoreError::DivideByZero);
                }
                // i64::MIN / -1 overflows and would panic under plain `/`; the ISA has
                // no overflow flag for division, so wrap per spec §8's no-panic rule.
                result.value = a.wrapping_div(b) as u64;
                result.flags.carry = false;
            }
            Increment => {
                let (value, carry) = a.overflowing_add(1);
                result.value = value as u64;
                result.flags.carry = carry;
            }
            Decrement => {
                let (value, carry) = a.overflowing_sub(1);
                result.value = value as u64;
                result.flags.carry = carry;
            }
            Compare => {
                let b = instruction.operands[1].value as i64;
                result.flags.zero = a == b;
                result.flags.carry = a < b;
                return Ok(());
            }
            other => unreachable!("opcode {other} is not an alu opcode"),
        }

        let value = result.value as i64;
        result.flags.sign = value < 0;
        result.flags.zero = value == 0;
        result.flags.parity = value.count_ones() == (Word::BITS / 2);
        Ok(())
    }

    fn execute_branch(&mut self, instruction: &mut Instruction) -> Result<(), CoreError> {
        use soc_asm::Opcode::*;
        match instruction.opcode {
            Jump => {
                self.program_counter = instruction.operands[0].value;
            }
            JumpLess => {
                if self.flags.carry {
                    self.program_counter = instruction.operands[0].value;
                }
            }
            Endprgm => {
                self.terminated_count += 1;
                self.program_counter = 0;
                tracing::info!(terminated = self.terminated_count, "program terminated");
            }
            Call | Return => {
                return Err(CoreError::IsaViolation(format!(
                    "{} is reserved and not implemented",
                    instruction.opcode
                )));
            }
            other => unreachable!("opcode {other} is not a branch opcode"),
        }
        Ok(())
    }

    /// Commit `instruction.result` to the register file or emit a memory
    /// write request.
    pub fn write_back(&mut self, instruction: &mut Instruction) -> Result<Vec<MemoryRequest>, CoreError> {
        let requests = match instruction.result.destination {
            Destination::Register(r) => {
                self.set_register(r, instruction.result.value).map_err(|error| {
                    tracing::error!(
                        pc = self.program_counter,
                        opcode = %instruction.opcode,
                        %error,
                        "write-back failed"
                    );
                    error
                })?;
                Vec::new()
            }
            Destination::Memory(address) => {
                vec![MemoryRequest::write(address, vec![instruction.result.value])]
            }
            Destination::Unused => Vec::new(),
        };
        tracing::debug!(destination = ?instruction.result.destination, "wrote back");
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_asm::image::{self, Dest};
    use soc_asm::{Destination, Instruction, Opcode, Operand, Outcome};

    fn alu(opcode: Opcode, a: i64, b: i64, dest: Dest) -> Instruction {
        image::alu2_embedded(opcode, a as u64, b as u64, dest)
    }

    fn gathered(mut instruction: Instruction) -> Instruction {
        for operand in &mut instruction.operands {
            operand.status = OperandStatus::Gathered;
        }
        instruction
    }

    #[test]
    fn add_sets_flags_per_formula() {
        let mut core = FunctionalCore::new(4);
        let mut instr = gathered(alu(Opcode::Add, 2, 3, Dest::Register(RegisterIndex(0))));
        core.execute(&mut instr).unwrap();
        assert_eq!(instr.result.value as i64, 5);
        assert!(!instr.result.flags.sign);
        assert!(!instr.result.flags.zero);
        assert!(!instr.result.flags.carry);
    }

    #[test]
    fn add_int64_max_plus_one_sets_carry() {
        let mut core = FunctionalCore::new(4);
        let mut instr = gathered(Instruction::new(
            Opcode::Add,
            vec![Operand::embedded(i64::MAX as u64), Operand::embedded(1)],
            Outcome { destination: Destination::Register(RegisterIndex(0)), value: 0, flags: Default::default() },
        ));
        core.execute(&mut instr).unwrap();
        assert!(instr.result.flags.carry);
    }

    #[test]
    fn subtract_int64_min_minus_one_sets_carry() {
        let mut core = FunctionalCore::new(4);
        let mut instr = gathered(Instruction::new(
            Opcode::Subtract,
            vec![Operand::embedded(i64::MIN as u64), Operand::embedded(1)],
            Outcome { destination: Destination::Register(RegisterIndex(0)), value: 0, flags: Default::default() },
        ));
        core.execute(&mut instr).unwrap();
        assert!(instr.result.flags.carry);
    }

    #[test]
    fn multiply_sets_carry_iff_not_reversible_by_division() {
        let mut core = FunctionalCore::new(4);
        let mut small = gathered(alu(Opcode::Multiply, 6, 7, Dest::Register(RegisterIndex(0))));
        core.execute(&mut small).unwrap();
        assert!(!small.result.flags.carry);

        let mut overflowing = gathered(Instruction::new(
            Opcode::Multiply,
            vec![Operand::embedded(i64::MAX as u64), Operand::embedded(2)],
            Outcome { destination: Destination::Register(RegisterIndex(0)), value: 0, flags: Default::default() },
        ));
        core.execute(&mut overflowing).unwrap();
        assert!(overflowing.result.flags.carry);
    }

    #[test]
    fn compare_sets_only_zero_and_carry() {
        let mut core = FunctionalCore::new(4);

        let mut equal = gathered(alu(Opcode::Compare, 4, 4, Dest::None));
        core.execute(&mut equal).unwrap();
        assert!(equal.result.flags.zero);
        assert!(!equal.result.flags.carry);

        let mut less = gathered(alu(Opcode::Compare, 1, 4, Dest::None));
        core.execute(&mut less).unwrap();
        assert!(!less.result.flags.zero);
        assert!(less.result.flags.carry);

        let mut greater = gathered(alu(Opcode::Compare, 4, 1, Dest::None));
        core.execute(&mut greater).unwrap();
        assert!(!greater.result.flags.zero);
        assert!(!greater.result.flags.carry);
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        let mut core = FunctionalCore::new(4);
        let mut instr = gathered(alu(Opcode::Divide, 10, 0, Dest::Register(RegisterIndex(0))));
        assert!(matches!(core.execute(&mut instr), Err(CoreError::DivideByZero)));
    }

    #[test]
    fn gather_operands_advances_pc_past_instruction_and_every_constant() {
        let mut core = FunctionalCore::new(4);
        core.set_application_start(0).unwrap();
        let mut instr = Instruction::new(
            Opcode::Add,
            vec![Operand::constant(), Operand::constant()],
            Outcome { destination: Destination::Register(RegisterIndex(0)), value: 0, flags: Default::default() },
        );
        let requests = core.gather_operands(&mut instr).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(core.program_counter(), 3);
    }

    #[test]
    fn register_operand_out_of_range_is_an_error() {
        let core = FunctionalCore::new(2);
        let result = core.register(RegisterIndex(5));
        assert!(matches!(result, Err(CoreError::RegisterOutOfRange { index: 5, len: 2 })));
    }

    #[test]
    fn second_doorbell_before_termination_is_doorbell_busy() {
        let mut core = FunctionalCore::new(4);
        core.set_application_start(10).unwrap();
        assert!(matches!(core.set_application_start(20), Err(CoreError::DoorbellBusy)));
    }

    #[test]
    fn doorbell_fires_again_after_endprgm_resets_pc() {
        let mut core = FunctionalCore::new(4);
        core.set_application_start(10).unwrap();
        let mut end = Instruction::new(Opcode::Endprgm, vec![], Outcome::none());
        core.execute(&mut end).unwrap();
        assert_eq!(core.program_counter(), 0);
        assert_eq!(core.terminated_count(), 1);

        core.set_application_start(99).unwrap();
        assert_eq!(core.program_counter(), 99);
    }
}
