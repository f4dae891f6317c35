//! The stateful half of the SoC simulator: memory transport, the structural
//! hazard tracker, the shared functional interpreter core, and the four
//! processor variants built on top of it.
//!
//! `soc-asm` is pure ISA/encoding; everything here is about running
//! programs against it.

#![forbid(unsafe_code)]

pub mod error;
pub mod functional_core;
pub mod hazard;
pub mod memory;
pub mod port;
pub mod processor;
pub mod stage;
pub mod stage_buffer;

pub use error::CoreError;
pub use functional_core::FunctionalCore;
pub use hazard::PendingDestinations;
pub use memory::{LinearMemory, MemoryModel, MemoryRequest, MemoryRequestKind, MemoryRequestStatus, MemoryResponse};
pub use port::Port;
pub use processor::{FunctionalProcessor, MemoryBoundProcessor, PipelinedProcessor, StagedProcessor};
pub use stage::{Scheduler, Stage};
pub use stage_buffer::StageBuffer;
