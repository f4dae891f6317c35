//! The memory-bound processor variant (spec §4.8): talks to memory only
//! through the same request/response ports the pipelined processor uses,
//! but keeps at most one instruction in flight, so fetch, execute, and
//! write-back collapse into a single handler and no hazard detection is
//! needed — there is never a second in-flight instruction to hazard
//! against.

use soc_asm::Opcode;
use soc_types::{Address, Word};

use crate::error::CoreError;
use crate::functional_core::FunctionalCore;
use crate::memory::{MemoryModel, MemoryRequest, MemoryResponse};
use crate::port::Port;

#[derive(Debug)]
pub struct MemoryBoundProcessor {
    core: FunctionalCore,
    instruction_request: Port<MemoryRequest>,
    instruction_response: Port<MemoryResponse>,
    data_request: Port<MemoryRequest>,
    data_response: Port<MemoryResponse>,
    memory_fetches: u64,
}

impl MemoryBoundProcessor {
    pub fn new(num_registers: usize) -> Self {
        Self {
            core: FunctionalCore::new(num_registers),
            instruction_request: Port::new(4),
            instruction_response: Port::new(4),
            data_request: Port::new(4),
            data_response: Port::new(4),
            memory_fetches: 0,
        }
    }

    pub fn registers(&self) -> &[Word] {
        self.core.registers()
    }

    pub fn memory_fetches(&self) -> u64 {
        self.memory_fetches
    }

    pub fn terminated_count(&self) -> u64 {
        self.core.terminated_count()
    }

    /// Push `request` through the outbound port and across to `memory`,
    /// then drain the matching response back through the inbound port.
    /// Single-issue, so the port never actually has to reject a write —
    /// back-pressure here is structural, not something this variant can
    /// trigger by itself (unlike `PipelinedProcessor`, which can queue
    /// several operand requests against one port at once).
    fn round_trip(
        request_port: &mut Port<MemoryRequest>,
        response_port: &mut Port<MemoryResponse>,
        memory: &mut impl MemoryModel,
        request: MemoryRequest,
    ) -> MemoryResponse {
        assert!(request_port.write(request.clone()), "single-issue processor never back-pressures its own port");
        let sent = request_port.read().expect("just wrote it");
        let response = memory.service(sent);
        assert!(response_port.write(response.clone()), "response port never back-pressures for one in-flight request");
        response_port.read().expect("just wrote it")
    }

    pub fn run_program(&mut self, start: Address, memory: &mut impl MemoryModel) -> Result<(), CoreError> {
        self.core.set_application_start(start)?;
        loop {
            let fetch_request = self.core.fetch();
            self.memory_fetches += 1;
            let fetch_response = Self::round_trip(
                &mut self.instruction_request,
                &mut self.instruction_response,
                memory,
                fetch_request,
            );
            let mut instruction = self.core.decode(&fetch_response)?;
            let is_endprgm = instruction.opcode == Opcode::Endprgm;

            let operand_requests = self.core.gather_operands(&mut instruction)?;
            let mut operand_responses = Vec::with_capacity(operand_requests.len());
            for request in operand_requests {
                self.memory_fetches += 1;
                operand_responses.push(Self::round_trip(
                    &mut self.data_request,
                    &mut self.data_response,
                    memory,
                    request,
                ));
            }
            self.core.process_operand_responses(&mut instruction, operand_responses);

            self.core.execute(&mut instruction)?;

            for request in self.core.write_back(&mut instruction)? {
                self.memory_fetches += 1;
                Self::round_trip(&mut self.data_request, &mut self.data_response, memory, request);
            }

            if is_endprgm {
                return Ok(());
            }
        }
    }
}
