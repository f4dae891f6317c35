//! The two demo program images the CLI can run, built with
//! `soc_asm::image` exactly as the integration tests build their seeds.

use soc_asm::image::{self, Dest};
use soc_asm::Instruction;
use soc_types::RegisterIndex;

/// `MEMORY[2] = 2 + 3`, then terminate. Corresponds to the simple-ADD seed.
pub fn simple() -> Vec<Instruction> {
    vec![image::add(2, 3, Dest::Memory(2)), image::endprgm()]
}

/// Five `ADD`s per iteration into `R0`, a loop counter in `R1` advanced by
/// `INCREMENT`/`COMPARE`/`JUMP_LESS`, two iterations, then terminate.
pub fn demo_loop() -> Vec<Instruction> {
    let r0 = RegisterIndex(0);
    let r1 = RegisterIndex(1);
    vec![
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::add(2, 3, Dest::Register(r0)),
        image::inc(r1),
        image::cmp_reg_embedded(r1, 2),
        image::jump_less(0),
        image::endprgm(),
    ]
}
