//! The staged processor (spec §4.8): the same four-stage pipeline as
//! [`crate::processor::pipelined::PipelinedProcessor`] with the hazard check
//! in `decode` disabled — it demonstrates, by running the same hazard seed
//! program, why that check exists in the first place.

use soc_types::{Address, Word};

use crate::error::CoreError;
use crate::memory::MemoryModel;

use super::pipeline_engine::PipelineEngine;

#[derive(Debug)]
pub struct StagedProcessor {
    engine: PipelineEngine,
}

impl StagedProcessor {
    pub fn new(num_registers: usize) -> Self {
        Self { engine: PipelineEngine::new(num_registers, false) }
    }

    pub fn registers(&self) -> &[Word] {
        self.engine.registers()
    }

    pub fn memory_fetches(&self) -> u64 {
        self.engine.memory_fetches()
    }

    pub fn terminated_count(&self) -> u64 {
        self.engine.terminated_count()
    }

    pub fn run_program(&mut self, start: Address, memory: &mut impl MemoryModel) -> Result<(), CoreError> {
        self.engine.run_program(start, memory)
    }
}
