//! The functional reference processor (spec §4.8): runs an entire program
//! to completion inside one call, calling memory directly. This is the
//! oracle spec §8 property 6 (oracle equivalence) checks the pipelined
//! processor against.

use soc_asm::Opcode;
use soc_types::{Address, Word};

use crate::error::CoreError;
use crate::functional_core::FunctionalCore;
use crate::memory::{LinearMemory, MemoryModel};

#[derive(Debug)]
pub struct FunctionalProcessor {
    core: FunctionalCore,
    memory: LinearMemory,
    memory_fetches: u64,
}

impl FunctionalProcessor {
    pub fn new(num_registers: usize, memory: LinearMemory) -> Self {
        Self { core: FunctionalCore::new(num_registers), memory, memory_fetches: 0 }
    }

    pub fn registers(&self) -> &[Word] {
        self.core.registers()
    }

    pub fn memory(&self) -> &LinearMemory {
        &self.memory
    }

    pub fn memory_fetches(&self) -> u64 {
        self.memory_fetches
    }

    pub fn terminated_count(&self) -> u64 {
        self.core.terminated_count()
    }

    /// Ring the doorbell at `start` and run the program to its `ENDPRGM`.
    pub fn run_program(&mut self, start: Address) -> Result<(), CoreError> {
        self.core.set_application_start(start)?;
        loop {
            let fetch_request = self.core.fetch();
            self.memory_fetches += 1;
            let fetch_response = self.memory.service(fetch_request);
            let mut instruction = self.core.decode(&fetch_response)?;
            let is_endprgm = instruction.opcode == Opcode::Endprgm;

            let operand_requests = self.core.gather_operands(&mut instruction)?;
            let operand_responses: Vec<_> = operand_requests
                .into_iter()
                .map(|request| {
                    self.memory_fetches += 1;
                    self.memory.service(request)
                })
                .collect();
            self.core.process_operand_responses(&mut instruction, operand_responses);

            self.core.execute(&mut instruction)?;

            for request in self.core.write_back(&mut instruction)? {
                self.memory_fetches += 1;
                self.memory.service(request);
            }

            if is_endprgm {
                return Ok(());
            }
        }
    }
}
