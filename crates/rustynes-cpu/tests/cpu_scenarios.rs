//! End-to-end instruction and interrupt scenarios, driven through `NesBus`.

use rustynes_cpu::{Bus, Cpu, NesBus, NromMapper, PpuStub, StatusFlags};

fn nes_bus(prg_rom: Vec<u8>) -> NesBus<PpuStub, NromMapper> {
    NesBus::new(PpuStub::new(), NromMapper::new(prg_rom).expect("valid PRG size"))
}

/// Builds a 32 KiB NROM image with `program` loaded at CPU address `$8000`
/// and the reset vector pointed at it.
fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0u8; 32 * 1024];
    prg[..program.len()].copy_from_slice(program);
    // reset vector -> $8000
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    prg
}

#[test]
fn lda_immediate_sets_flags_from_loaded_value() {
    let mut bus = nes_bus(rom_with_program(&[0xA9, 0x00, 0xA9, 0x80, 0xA9, 0x2A]));
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    assert_eq!(cpu.step(&mut bus), 2); // LDA #$00
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.status.contains(StatusFlags::ZERO));
    assert!(!cpu.status.contains(StatusFlags::NEGATIVE));

    assert_eq!(cpu.step(&mut bus), 2); // LDA #$80
    assert_eq!(cpu.a, 0x80);
    assert!(!cpu.status.contains(StatusFlags::ZERO));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));

    assert_eq!(cpu.step(&mut bus), 2); // LDA #$2A
    assert_eq!(cpu.a, 0x2A);
    assert!(!cpu.status.contains(StatusFlags::ZERO));
    assert!(!cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn zero_page_x_wraps_within_the_zero_page() {
    // LDX #$FF ; LDA #$42 ; STA $80,X  -> effective address wraps to $7F, not $017F
    let mut bus = nes_bus(rom_with_program(&[0xA2, 0xFF, 0xA9, 0x42, 0x95, 0x80]));
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    assert_eq!(cpu.step(&mut bus), 2); // LDX #$FF
    assert_eq!(cpu.step(&mut bus), 2); // LDA #$42
    assert_eq!(cpu.step(&mut bus), 4); // STA $80,X

    assert_eq!(bus.read(0x007F), 0x42);
}

#[test]
fn branch_taken_with_page_cross_costs_four_cycles() {
    let mut prg = vec![0u8; 32 * 1024];
    prg[0] = 0xA9; // LDA #$00, sets Z
    prg[1] = 0x00;
    // BEQ placed right at the end of the $80xx page, so the branch target
    // lands in $81xx.
    prg[0x00FC] = 0xF0;
    prg[0x00FD] = 0x05;
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    let mut bus = nes_bus(prg);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    cpu.step(&mut bus); // LDA #$00
    cpu.pc = 0x80FC; // jump straight to the BEQ for this scenario

    let cycles_before = cpu.cycles;
    let branch_pc_after_operand = 0x80FEu16;
    let taken_cycles = cpu.step(&mut bus); // BEQ, taken
    let target = branch_pc_after_operand.wrapping_add(0x05);

    assert_eq!(cpu.pc, target);
    assert_ne!(target & 0xFF00, branch_pc_after_operand & 0xFF00);
    assert_eq!(taken_cycles, 4);
    assert_eq!(cpu.cycles - cycles_before, 4);
}

#[test]
fn jsr_then_rts_round_trips_pc_and_stack_pointer() {
    let mut program = vec![0x20, 0x10, 0x80]; // JSR $8010
    program.resize(0x10, 0xEA); // pad with NOPs
    program.push(0x60); // RTS at $8010
    let mut bus = nes_bus(rom_with_program(&program));
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    let sp_before = cpu.sp;
    cpu.step(&mut bus); // JSR
    assert_eq!(cpu.pc, 0x8010);
    assert_eq!(cpu.sp, sp_before.wrapping_sub(2));

    cpu.step(&mut bus); // RTS
    assert_eq!(cpu.pc, 0x8003);
    assert_eq!(cpu.sp, sp_before);
}

#[test]
fn jmp_indirect_reproduces_the_page_wrap_bug() {
    // Pointer at $80FF: low byte from $80FF, high byte incorrectly taken
    // from $8000 instead of $8100.
    let mut prg = vec![0u8; 32 * 1024];
    prg[0] = 0x6C; // JMP (ind)
    prg[1] = 0xFF;
    prg[2] = 0x80;
    prg[0xFF] = 0x34; // pointer low byte at $80FF
    prg[0x00] = 0x12; // wrapped high byte fetch reads $8000, not $8100
    prg[0x100] = 0x99; // the "correct" non-buggy high byte, must NOT be used
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    let mut bus = nes_bus(prg);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    cpu.step(&mut bus);

    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn nmi_dispatches_after_the_in_flight_instruction_completes() {
    let mut prg = rom_with_program(&[0xEA, 0xEA, 0xEA]);
    prg[0x7FFA] = 0x00; // NMI vector -> $9000
    prg[0x7FFB] = 0x90;
    let mut bus = nes_bus(prg);

    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    cpu.step(&mut bus); // first NOP completes uninterrupted
    assert_eq!(cpu.pc, 0x8001);

    // NMI arrives after the first instruction retires; polling happens at
    // the top of the next instruction's fetch, so it is serviced before the
    // second NOP runs rather than in the middle of it.
    cpu.trigger_nmi();
    let nmi_cycles = cpu.step(&mut bus); // NMI dispatch sequence
    assert_eq!(nmi_cycles, 7);
    assert_eq!(cpu.pc, 0x9000);
    assert!(cpu.status.contains(StatusFlags::INTERRUPT_DISABLE));
}

#[test]
fn php_then_plp_round_trips_status_flags() {
    // SEC ; PHP ; CLC ; PLP -- PLP must restore the carry PHP captured.
    let mut bus = nes_bus(rom_with_program(&[0x38, 0x08, 0x18, 0x28]));
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    cpu.step(&mut bus); // SEC
    assert!(cpu.status.contains(StatusFlags::CARRY));

    let sp_before = cpu.sp;
    cpu.step(&mut bus); // PHP
    assert_eq!(cpu.sp, sp_before.wrapping_sub(1));

    cpu.step(&mut bus); // CLC
    assert!(!cpu.status.contains(StatusFlags::CARRY));

    cpu.step(&mut bus); // PLP
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert_eq!(cpu.sp, sp_before);
}

#[test]
fn rti_restores_status_and_pc_from_the_stack() {
    // A BRK-driven handler whose RTI must restore the pre-interrupt status
    // and resume right after the two-byte BRK.
    let mut prg = rom_with_program(&[0xA9, 0xFF, 0x00, 0xEA]); // LDA #$FF ; BRK ; NOP
    prg[0x7FFE] = 0x00; // IRQ/BRK vector -> $9000
    prg[0x7FFF] = 0x90;
    prg[0x1000] = 0x40; // RTI at $9000
    let mut bus = nes_bus(prg);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    cpu.step(&mut bus); // LDA #$FF sets N
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));

    cpu.step(&mut bus); // BRK
    assert_eq!(cpu.pc, 0x9000);
    assert!(cpu.status.contains(StatusFlags::INTERRUPT_DISABLE));

    cpu.step(&mut bus); // RTI
    // BRK's padding byte at $8003 is discarded, so the pushed (and restored)
    // return address is $8004, one past it.
    assert_eq!(cpu.pc, 0x8004);
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
    assert!(!cpu.status.contains(StatusFlags::INTERRUPT_DISABLE));
}

#[test]
fn jam_opcode_halts_the_cpu() {
    let mut bus = nes_bus(rom_with_program(&[0x02]));
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    cpu.step(&mut bus);

    assert!(cpu.is_jammed());
    let pc_after_jam = cpu.pc;
    let cycles_after_jam = cpu.cycles;
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, pc_after_jam);
    assert_eq!(cpu.cycles, cycles_after_jam + 1);
}
