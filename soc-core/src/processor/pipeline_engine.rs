//! The handler set shared by [`crate::processor::staged::StagedProcessor`]
//! and [`crate::processor::pipelined::PipelinedProcessor`] (spec §4.5).
//!
//! The two variants differ only in whether `decode` runs the hazard check —
//! everything else (the four stage buffers, the outbound request pumps, the
//! scheduler wiring) is identical, so both wrap this one engine instead of
//! duplicating it.

use std::collections::VecDeque;

use soc_asm::{details, Destination, Instruction, Opcode, OpcodeClass};
use soc_types::{Address, Word};

use crate::error::CoreError;
use crate::functional_core::FunctionalCore;
use crate::hazard::PendingDestinations;
use crate::memory::{MemoryModel, MemoryRequest, MemoryRequestStatus, MemoryResponse};
use crate::port::Port;
use crate::stage::{Scheduler, Stage};
use crate::stage_buffer::StageBuffer;

#[derive(Debug)]
pub struct PipelineEngine {
    core: FunctionalCore,
    hazard_checking: bool,

    instruction_request: Port<MemoryRequest>,
    instruction_response: Port<MemoryResponse>,
    data_request: Port<MemoryRequest>,
    data_response: Port<MemoryResponse>,

    fetcher: StageBuffer<MemoryRequest>,
    decoder: StageBuffer<MemoryResponse>,
    executor: StageBuffer<Instruction>,
    writeback: StageBuffer<Instruction>,

    operand_requests: VecDeque<MemoryRequest>,
    writeback_requests: VecDeque<MemoryRequest>,
    pending: PendingDestinations,

    scheduler: Scheduler,
    application_terminated: bool,
    memory_fetches: u64,
    hazard_stalls: u64,
}

impl PipelineEngine {
    pub fn new(num_registers: usize, hazard_checking: bool) -> Self {
        Self {
            core: FunctionalCore::new(num_registers),
            hazard_checking,
            instruction_request: Port::new(4),
            instruction_response: Port::new(4),
            data_request: Port::new(4),
            data_response: Port::new(4),
            fetcher: StageBuffer::new(),
            decoder: StageBuffer::new(),
            executor: StageBuffer::new(),
            writeback: StageBuffer::new(),
            operand_requests: VecDeque::new(),
            writeback_requests: VecDeque::new(),
            pending: PendingDestinations::new(),
            scheduler: Scheduler::new(),
            application_terminated: true,
            memory_fetches: 0,
            hazard_stalls: 0,
        }
    }

    pub fn registers(&self) -> &[Word] {
        self.core.registers()
    }

    pub fn memory_fetches(&self) -> u64 {
        self.memory_fetches
    }

    /// How many times `decode` found a ready instruction but broke out of
    /// its loop because the hazard check failed. Always `0` when hazard
    /// checking is disabled.
    pub fn hazard_stalls(&self) -> u64 {
        self.hazard_stalls
    }

    pub fn terminated_count(&self) -> u64 {
        self.core.terminated_count()
    }

    pub fn run_program(&mut self, start: Address, memory: &mut impl MemoryModel) -> Result<(), CoreError> {
        self.doorbell_arrive(start)?;
        self.run_until_quiescent(memory)?;
        Ok(())
    }

    fn doorbell_arrive(&mut self, address: Address) -> Result<(), CoreError> {
        self.application_terminated = false;
        self.core.set_application_start(address)?;
        self.scheduler.schedule(Stage::FetchEmit);
        Ok(())
    }

    fn run_until_quiescent(&mut self, memory: &mut impl MemoryModel) -> Result<(), CoreError> {
        loop {
            if let Some(stage) = self.scheduler.next() {
                self.run_stage(stage)?;
                self.promote_waiters();
                continue;
            }
            if !self.service_memory(memory) {
                return Ok(());
            }
        }
    }

    fn run_stage(&mut self, stage: Stage) -> Result<(), CoreError> {
        match stage {
            Stage::DoorbellArrive => unreachable!("doorbell_arrive is invoked directly, not scheduled"),
            Stage::FetchEmit => self.fetch_emit(),
            Stage::FetcherDrain => self.fetcher_drain()?,
            Stage::InstructionReturn => self.instruction_return()?,
            Stage::Decode => self.decode()?,
            Stage::OperandResponse => self.operand_response()?,
            Stage::Execute => self.execute()?,
            Stage::WriteBack => self.write_back()?,
            Stage::SendOperandRequests => self.send_operand_requests(),
            Stage::SendWritebackRequests => self.send_writeback_requests(),
        }
        Ok(())
    }

    /// Promote every buffer/port waiter whose armed predicate now holds.
    /// Stands in for the framework's automatic readable/writable scheduling
    /// (spec §4.5's preamble) without inventing a generic watch-list
    /// abstraction per buffer kind.
    fn promote_waiters(&mut self) {
        self.scheduler.schedule_many(self.fetcher.drain_ready_waiters());
        self.scheduler.schedule_many(self.decoder.drain_ready_waiters());
        self.scheduler.schedule_many(self.executor.drain_ready_waiters());
        self.scheduler.schedule_many(self.writeback.drain_ready_waiters());
        self.scheduler.schedule_many(self.instruction_request.drain_ready_waiters());
        self.scheduler.schedule_many(self.instruction_response.drain_ready_waiters());
        self.scheduler.schedule_many(self.data_request.drain_ready_waiters());
        self.scheduler.schedule_many(self.data_response.drain_ready_waiters());
    }

    /// Carry one request each way between the outbound ports and `memory`.
    /// Returns whether anything actually moved, so the caller can tell
    /// quiescence (nothing left in the scheduler, nothing left for memory to
    /// do) from a stage that's merely waiting on a full port.
    fn service_memory(&mut self, memory: &mut impl MemoryModel) -> bool {
        let mut progressed = false;
        if self.instruction_request.read_valid() {
            let request = self.instruction_request.read().expect("checked read_valid");
            self.memory_fetches += 1;
            let response = memory.service(request);
            if self.instruction_response.write(response) {
                self.scheduler.schedule(Stage::InstructionReturn);
                progressed = true;
            }
        }
        if self.data_request.read_valid() {
            let request = self.data_request.read().expect("checked read_valid");
            self.memory_fetches += 1;
            let response = memory.service(request);
            if self.data_response.write(response) {
                self.scheduler.schedule(Stage::OperandResponse);
                progressed = true;
            }
        }
        progressed
    }

    fn fetch_emit(&mut self) {
        if self.application_terminated {
            return;
        }
        if self.fetcher.write_valid() {
            let request = self.core.fetch();
            self.fetcher.write(request).expect("checked write_valid");
            self.scheduler.schedule(Stage::FetcherDrain);
        } else {
            self.fetcher.notify_on_writable(Stage::FetchEmit);
        }
    }

    fn fetcher_drain(&mut self) -> Result<(), CoreError> {
        if !self.fetcher.read_valid() {
            return Ok(());
        }
        let pending = self.fetcher.peek()?.status == MemoryRequestStatus::Pending;
        if pending && self.instruction_request.write_valid() {
            let request = {
                let slot = self.fetcher.peek()?;
                slot.status = MemoryRequestStatus::Sent;
                slot.clone()
            };
            self.instruction_request.write(request);
        } else if pending {
            self.instruction_request.notify_on_writable(Stage::FetcherDrain);
        }
        Ok(())
    }

    fn instruction_return(&mut self) -> Result<(), CoreError> {
        while self.instruction_response.read_valid() && self.fetcher.read_valid() && self.decoder.write_valid() {
            let response = self.instruction_response.read().expect("checked read_valid");
            self.decoder.write(response)?;
            self.scheduler.schedule(Stage::Decode);
        }
        if self.instruction_response.read_valid() && !self.decoder.write_valid() {
            self.decoder.notify_on_writable(Stage::InstructionReturn);
        }
        Ok(())
    }

    fn decode(&mut self) -> Result<(), CoreError> {
        loop {
            let ready = self.decoder.read_valid()
                && self.fetcher.read_valid()
                && self.operand_requests.is_empty()
                && self.executor.write_valid();
            if !ready {
                break;
            }

            let mut instruction = self.core.decode(self.decoder.peek()?)?;
            if instruction.opcode == Opcode::Endprgm {
                self.application_terminated = true;
            }

            if self.hazard_checking && !self.pending.check(&instruction, self.core.registers()) {
                self.hazard_stalls += 1;
                break;
            }

            self.decoder.read()?;
            self.fetcher.read()?;

            let requests = self.core.gather_operands(&mut instruction)?;
            match instruction.result.destination {
                Destination::Register(r) => self.pending.push_register(r),
                Destination::Memory(a) => self.pending.push_address(a),
                Destination::Unused => {}
            }

            let is_branch = details(instruction.opcode).class == OpcodeClass::Branch;
            self.executor.write(instruction)?;
            self.scheduler.schedule(Stage::Execute);
            self.operand_requests.extend(requests);
            self.scheduler.schedule(Stage::SendOperandRequests);
            if !is_branch {
                self.scheduler.schedule(Stage::FetchEmit);
            }
        }
        Ok(())
    }

    fn operand_response(&mut self) -> Result<(), CoreError> {
        if !self.executor.read_valid() {
            return Ok(());
        }
        let mut buffer = Vec::new();
        while self.data_response.read_valid() {
            buffer.push(self.data_response.read().expect("checked read_valid"));
        }
        if buffer.is_empty() {
            return Ok(());
        }
        let instruction = self.executor.peek()?;
        self.core.process_operand_responses(instruction, buffer);
        if instruction.operands_gathered() {
            self.scheduler.schedule(Stage::Execute);
        }
        Ok(())
    }

    fn execute(&mut self) -> Result<(), CoreError> {
        while self.executor.read_valid() && self.executor.peek()?.operands_gathered() && self.writeback.write_valid() {
            let mut instruction = self.executor.read()?;
            self.core.execute(&mut instruction)?;
            let is_branch = details(instruction.opcode).class == OpcodeClass::Branch;
            self.writeback.write(instruction)?;
            self.scheduler.schedule(Stage::WriteBack);
            if is_branch {
                self.scheduler.schedule(Stage::FetchEmit);
            }
        }
        Ok(())
    }

    fn write_back(&mut self) -> Result<(), CoreError> {
        while self.writeback.read_valid() {
            let mut instruction = self.writeback.read()?;
            let requests = self.core.write_back(&mut instruction)?;
            match instruction.result.destination {
                Destination::Register(_) => self.pending.pop_register(),
                Destination::Memory(_) => self.pending.pop_address(),
                Destination::Unused => {}
            }
            self.writeback_requests.extend(requests);
            self.scheduler.schedule(Stage::SendWritebackRequests);
            self.scheduler.schedule(Stage::Decode);
        }
        Ok(())
    }

    fn send_operand_requests(&mut self) {
        while !self.operand_requests.is_empty() && self.data_request.write_valid() {
            let request = self.operand_requests.pop_front().expect("checked non-empty");
            self.data_request.write(request);
        }
        if !self.operand_requests.is_empty() {
            self.data_request.notify_on_writable(Stage::SendOperandRequests);
        }
    }

    fn send_writeback_requests(&mut self) {
        while !self.writeback_requests.is_empty() && self.data_request.write_valid() {
            let request = self.writeback_requests.pop_front().expect("checked non-empty");
            self.data_request.write(request);
        }
        if !self.writeback_requests.is_empty() {
            self.data_request.notify_on_writable(Stage::SendWritebackRequests);
        }
    }
}
