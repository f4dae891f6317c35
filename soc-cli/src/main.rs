//! `soc-sim`: assemble a demo program, run it to completion on one of the
//! four processor variants, and report the final register file, relevant
//! memory words, and run counters.

mod demo;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use soc_asm::image::assemble;
use soc_core::{FunctionalProcessor, LinearMemory, MemoryBoundProcessor, PipelinedProcessor, StagedProcessor};
use soc_types::Address;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Program {
    Simple,
    Loop,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Functional,
    MemoryBound,
    Staged,
    Pipelined,
}

/// Run a demo program on the SoC processor simulator.
#[derive(Debug, Parser)]
#[command(name = "soc-sim", about = "Run a demo program on the SoC processor simulator")]
struct Cli {
    /// Which demo program to assemble and run.
    #[arg(long, value_enum, default_value_t = Program::Simple)]
    program: Program,

    /// Which processor variant drives the run.
    #[arg(long, value_enum, default_value_t = Variant::Pipelined)]
    variant: Variant,

    /// Number of general-purpose registers to give the processor.
    #[arg(long, default_value_t = 8)]
    registers: usize,
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Program::Simple => write!(f, "simple"),
            Program::Loop => write!(f, "loop"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    tracing::info!(program = %cli.program, "assembling demo program");

    let instructions = match cli.program {
        Program::Simple => demo::simple(),
        Program::Loop => demo::demo_loop(),
    };
    let mut memory = LinearMemory::with_words(assemble(&instructions));
    let start: Address = 0;

    match cli.variant {
        Variant::Functional => {
            // The functional variant owns its memory outright rather than
            // talking to it through ports, so it gets its own copy of the
            // image.
            let mut proc = FunctionalProcessor::new(cli.registers, memory.clone());
            proc.run_program(start).context("functional processor run failed")?;
            report("functional", proc.registers(), proc.memory_fetches(), proc.terminated_count());
            sample_memory(proc.memory());
        }
        Variant::MemoryBound => {
            let mut proc = MemoryBoundProcessor::new(cli.registers);
            proc.run_program(start, &mut memory).context("memory-bound processor run failed")?;
            report("memory-bound", proc.registers(), proc.memory_fetches(), proc.terminated_count());
            sample_memory(&memory);
        }
        Variant::Staged => {
            let mut proc = StagedProcessor::new(cli.registers);
            proc.run_program(start, &mut memory).context("staged processor run failed")?;
            report("staged", proc.registers(), proc.memory_fetches(), proc.terminated_count());
            sample_memory(&memory);
        }
        Variant::Pipelined => {
            let mut proc = PipelinedProcessor::new(cli.registers);
            proc.run_program(start, &mut memory).context("pipelined processor run failed")?;
            report("pipelined", proc.registers(), proc.memory_fetches(), proc.terminated_count());
            tracing::info!(stalls = proc.hazard_stalls(), "hazard stalls observed");
            sample_memory(&memory);
        }
    }

    Ok(())
}

fn report(variant: &str, registers: &[u64], memory_fetches: u64, terminated_count: u64) {
    tracing::info!(variant, ?registers, memory_fetches, terminated_count, "run complete");
}

fn sample_memory(memory: &LinearMemory) {
    tracing::info!(word_2 = memory.read_word(2), word_200 = memory.read_word(200), "sampled memory words");
}
