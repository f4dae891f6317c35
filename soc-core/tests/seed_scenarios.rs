//! End-to-end scenarios run against the full processor stack.

use soc_asm::image::{self, Dest};
use soc_core::{FunctionalProcessor, LinearMemory, MemoryBoundProcessor, PipelinedProcessor, StagedProcessor};
use soc_types::RegisterIndex;

fn image_memory(instructions: &[soc_asm::Instruction]) -> LinearMemory {
    LinearMemory::with_words(image::assemble(instructions))
}

#[test]
fn s1_simple_add_writes_memory() {
    let memory = image_memory(&[image::add(2, 3, Dest::Memory(2)), image::endprgm()]);
    let mut proc = FunctionalProcessor::new(8, memory);
    proc.run_program(0).unwrap();
    assert_eq!(proc.memory().read_word(2), 5);
    assert_eq!(proc.terminated_count(), 1);
}

#[test]
fn s2_loop_five_adds_two_iterations() {
    let r0 = RegisterIndex(0);
    let r1 = RegisterIndex(1);
    let program = [
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::inc(r1),
        image::cmp_reg_embedded(r1, 2),
        image::jump_less(0),
        image::endprgm(),
    ];
    let mut memory = image_memory(&program);
    let mut proc = PipelinedProcessor::new(8);
    proc.run_program(0, &mut memory).unwrap();

    assert_eq!(proc.registers()[1], 2);
    assert_eq!(proc.terminated_count(), 1);
    assert!(proc.memory_fetches() >= 2 * (5 + 3) + 1);
}

#[test]
fn s3_add_sets_flags_per_formula() {
    let r0 = RegisterIndex(0);
    let program = [image::add(127, 1, Dest::Register(r0)), image::endprgm()];
    let mut memory = image_memory(&program);
    let mut proc = PipelinedProcessor::new(4);
    proc.run_program(0, &mut memory).unwrap();

    assert_eq!(proc.registers()[0], 128);
}

#[test]
fn s4_hazard_stalls_and_matches_oracle() {
    let r0 = RegisterIndex(0);
    let program = [
        image::inc(r0),
        add_reg_embedded(r0),
        image::endprgm(),
    ];

    let oracle_memory = image_memory(&program);
    let mut oracle = FunctionalProcessor::new(4, oracle_memory);
    oracle.run_program(0).unwrap();

    let mut pipelined_memory = image_memory(&program);
    let mut pipelined = PipelinedProcessor::new(4);
    pipelined.run_program(0, &mut pipelined_memory).unwrap();

    assert_eq!(pipelined.registers()[0], oracle.registers()[0]);
    assert_eq!(pipelined.registers()[0], 2);
    assert!(pipelined.hazard_stalls() >= 1, "pipelined decode should have stalled on the register hazard");
}

// `ADD REGISTER[r], embedded 1 -> REGISTER[r]` isn't one of image's fixed-arity
// helpers (`add` only builds the embedded/embedded form), so the hazard seed
// builds it directly from soc_asm's primitives.
fn add_reg_embedded(r: RegisterIndex) -> soc_asm::Instruction {
    soc_asm::Instruction::new(
        soc_asm::Opcode::Add,
        vec![soc_asm::Operand::register(r), soc_asm::Operand::embedded(1)],
        soc_asm::Outcome { destination: soc_asm::Destination::Register(r), value: 0, flags: Default::default() },
    )
}

#[test]
fn s5_indirect_memory_read_through_register() {
    let r1 = RegisterIndex(1);
    let program = [
        image::mov_embedded(100, Dest::Register(r1)),
        image::move_indirect(r1, Dest::Memory(200)),
        image::endprgm(),
    ];
    let mut memory = image_memory(&program);
    memory.write_word(100, 42);

    let mut proc = PipelinedProcessor::new(4);
    proc.run_program(0, &mut memory).unwrap();

    assert_eq!(memory.read_word(200), 42);
}

#[test]
fn s6_branch_flush_reissues_fetch_until_guard_trips() {
    let r0 = RegisterIndex(0);
    let program = [
        image::inc(r0),
        image::cmp_reg_embedded(r0, 3),
        image::jump_less(0),
        image::endprgm(),
    ];

    let oracle_memory = image_memory(&program);
    let mut oracle = FunctionalProcessor::new(4, oracle_memory);
    oracle.run_program(0).unwrap();

    let mut memory = image_memory(&program);
    let mut proc = PipelinedProcessor::new(4);
    proc.run_program(0, &mut memory).unwrap();

    assert_eq!(proc.registers()[0], 3);
    assert_eq!(proc.registers()[0], oracle.registers()[0]);
    assert_eq!(proc.terminated_count(), 1);
}

#[test]
fn memory_bound_and_staged_variants_agree_with_the_oracle_on_s1() {
    let program = [image::add(2, 3, Dest::Memory(2)), image::endprgm()];

    let oracle_memory = image_memory(&program);
    let mut oracle = FunctionalProcessor::new(4, oracle_memory);
    oracle.run_program(0).unwrap();

    let mut memory_bound_store = image_memory(&program);
    let mut memory_bound = MemoryBoundProcessor::new(4);
    memory_bound.run_program(0, &mut memory_bound_store).unwrap();
    assert_eq!(memory_bound_store.read_word(2), oracle.memory().read_word(2));

    let mut staged_store = image_memory(&program);
    let mut staged = StagedProcessor::new(4);
    staged.run_program(0, &mut staged_store).unwrap();
    assert_eq!(staged_store.read_word(2), oracle.memory().read_word(2));
}

#[test]
fn staged_processor_has_no_hazard_check_but_still_reaches_the_oracle_answer_here() {
    // S4's hazard only bites the pipelined variant's overlap; a staged
    // run still completes (single in-flight instruction means there's
    // nothing to hazard against in the first place).
    let r0 = RegisterIndex(0);
    let program = [image::inc(r0), add_reg_embedded(r0), image::endprgm()];
    let mut memory = image_memory(&program);
    let mut proc = StagedProcessor::new(4);
    proc.run_program(0, &mut memory).unwrap();
    assert_eq!(proc.registers()[0], 2);
}
