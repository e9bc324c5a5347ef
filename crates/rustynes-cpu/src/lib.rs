//! Cycle-accurate MOS 6502 CPU emulator for NES.
//!
//! This crate provides a cycle-accurate emulation of the MOS 6502 CPU as used
//! in the Nintendo Entertainment System. It supports:
//!
//! - All 256 opcodes (official and unofficial)
//! - Cycle-accurate timing with per-cycle state machine execution
//! - Interrupt handling (NMI, IRQ, BRK) with correct polling and hijacking
//!   semantics
//! - DMA stall cycles
//! - Page boundary crossing penalty cycles
//! - A minimal, independently testable NES memory map ([`NesBus`]), PPU
//!   collaborator stub, and NROM mapper, plus an iNES ROM loader
//!
//! # Architecture
//!
//! The CPU accesses memory exclusively through the [`Bus`] trait, so it can
//! be driven against any memory subsystem. [`NesBus`] is one concrete,
//! intentionally minimal implementation assembled from [`PpuStub`] and
//! [`NromMapper`].
//!
//! # Example
//!
//! ```no_run
//! use rustynes_cpu::{Cpu, Bus};
//!
//! struct SimpleBus {
//!     memory: [u8; 65536],
//! }
//!
//! impl Bus for SimpleBus {
//!     fn read(&mut self, addr: u16) -> u8 {
//!         self.memory[addr as usize]
//!     }
//!
//!     fn write(&mut self, addr: u16, value: u8) {
//!         self.memory[addr as usize] = value;
//!     }
//! }
//!
//! let mut bus = SimpleBus { memory: [0; 65536] };
//! let mut cpu = Cpu::new();
//! cpu.reset(&mut bus);
//! cpu.step(&mut bus);
//! ```

#![warn(missing_docs)]

mod addressing;
mod bus;
mod cpu;
mod ines;
mod mmu;
mod opcodes;
mod state;
mod status;
mod trace;

pub use addressing::AddressingMode;
pub use bus::Bus;
pub use cpu::Cpu;
pub use ines::{INesHeader, INesRom};
pub use mmu::{Mapper, NesBus, NromMapper, PpuCollaborator, PpuStub, RomError};
pub use opcodes::{OpcodeInfo, OPCODE_TABLE};
pub use state::{CpuState, InstructionType};
pub use status::StatusFlags;
pub use trace::{CpuTracer, TraceEntry};

/// CPU error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CpuError {
    /// Invalid opcode encountered.
    ///
    /// In practice unreachable: [`OPCODE_TABLE`] is total over all 256 byte
    /// values, so decode never fails. Kept so `Result`-returning callers
    /// have somewhere to put a failure if that ever changes.
    #[error("Invalid opcode: 0x{0:02X} at address 0x{1:04X}")]
    InvalidOpcode(u8, u16),
}

/// Result type for CPU operations.
pub type Result<T> = std::result::Result<T, CpuError>;

/// Interrupt and reset vector addresses.
pub mod vectors {
    /// NMI (Non-Maskable Interrupt) vector address.
    pub const NMI: u16 = 0xFFFA;
    /// Reset vector address.
    pub const RESET: u16 = 0xFFFC;
    /// IRQ/BRK vector address.
    pub const IRQ: u16 = 0xFFFE;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestBus {
        memory: [u8; 65536],
    }

    impl TestBus {
        fn new() -> Self {
            Self { memory: [0; 65536] }
        }

        fn load_program(&mut self, addr: u16, program: &[u8]) {
            for (i, &byte) in program.iter().enumerate() {
                self.memory[addr as usize + i] = byte;
            }
        }
    }

    impl Bus for TestBus {
        fn read(&mut self, addr: u16) -> u8 {
            self.memory[addr as usize]
        }

        fn write(&mut self, addr: u16, value: u8) {
            self.memory[addr as usize] = value;
        }
    }

    fn with_reset_vector(program: &[u8]) -> TestBus {
        let mut bus = TestBus::new();
        bus.load_program(0x8000, program);
        bus.memory[0xFFFC] = 0x00;
        bus.memory[0xFFFD] = 0x80;
        bus
    }

    #[test]
    fn test_cpu_reset() {
        let mut bus = with_reset_vector(&[]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        assert_eq!(cpu.pc, 0x8000);
        assert_eq!(cpu.sp, 0xFD);
        assert!(cpu.status.contains(StatusFlags::INTERRUPT_DISABLE));
        assert!(cpu.status.contains(StatusFlags::UNUSED));
    }

    #[test]
    fn test_lda_immediate() {
        let mut bus = with_reset_vector(&[0xA9, 0x42]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus);

        assert_eq!(cpu.a, 0x42);
        assert_eq!(cpu.pc, 0x8002);
        assert!(!cpu.status.contains(StatusFlags::ZERO));
        assert!(!cpu.status.contains(StatusFlags::NEGATIVE));
    }

    #[test]
    fn test_lda_zero_flag() {
        let mut bus = with_reset_vector(&[0xA9, 0x00]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus);

        assert_eq!(cpu.a, 0x00);
        assert!(cpu.status.contains(StatusFlags::ZERO));
        assert!(!cpu.status.contains(StatusFlags::NEGATIVE));
    }

    #[test]
    fn test_lda_negative_flag() {
        let mut bus = with_reset_vector(&[0xA9, 0x80]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus);

        assert_eq!(cpu.a, 0x80);
        assert!(!cpu.status.contains(StatusFlags::ZERO));
        assert!(cpu.status.contains(StatusFlags::NEGATIVE));
    }

    #[test]
    fn test_sta_zero_page() {
        let mut bus = with_reset_vector(&[0xA9, 0x42, 0x85, 0x10]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus); // LDA
        cpu.step(&mut bus); // STA

        assert_eq!(bus.memory[0x10], 0x42);
    }

    #[test]
    fn test_adc_no_carry() {
        let mut bus = with_reset_vector(&[0xA9, 0x10, 0x69, 0x20]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus); // LDA
        cpu.step(&mut bus); // ADC

        assert_eq!(cpu.a, 0x30);
        assert!(!cpu.status.contains(StatusFlags::CARRY));
        assert!(!cpu.status.contains(StatusFlags::OVERFLOW));
    }

    #[test]
    fn test_adc_with_carry() {
        let mut bus = with_reset_vector(&[0xA9, 0xFF, 0x69, 0x02]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus); // LDA
        cpu.step(&mut bus); // ADC

        assert_eq!(cpu.a, 0x01);
        assert!(cpu.status.contains(StatusFlags::CARRY));
    }

    #[test]
    fn test_jmp_absolute() {
        let mut bus = with_reset_vector(&[0x4C, 0x10, 0x80]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus);

        assert_eq!(cpu.pc, 0x8010);
    }

    #[test]
    fn test_jsr_and_rts() {
        let mut bus = with_reset_vector(&[0x20, 0x10, 0x80]);
        bus.memory[0x8010] = 0x60; // RTS

        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        let initial_sp = cpu.sp;
        cpu.step(&mut bus); // JSR

        assert_eq!(cpu.pc, 0x8010);
        assert_eq!(cpu.sp, initial_sp.wrapping_sub(2));

        cpu.step(&mut bus); // RTS

        assert_eq!(cpu.pc, 0x8003);
        assert_eq!(cpu.sp, initial_sp);
    }

    #[test]
    fn test_branch_taken() {
        let mut bus = with_reset_vector(&[0xA9, 0x00, 0xF0, 0x05]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus); // LDA
        cpu.step(&mut bus); // BEQ

        // PC should be at 0x8004 + 0x05 = 0x8009
        assert_eq!(cpu.pc, 0x8009);
    }

    #[test]
    fn test_branch_not_taken() {
        let mut bus = with_reset_vector(&[0xA9, 0x01, 0xF0, 0x05]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus); // LDA
        cpu.step(&mut bus); // BEQ

        assert_eq!(cpu.pc, 0x8004);
    }

    #[test]
    fn test_push_and_pull() {
        let mut bus = with_reset_vector(&[0xA9, 0x42, 0x48, 0xA9, 0x00, 0x68]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.step(&mut bus); // LDA #$42
        cpu.step(&mut bus); // PHA
        cpu.step(&mut bus); // LDA #$00
        assert_eq!(cpu.a, 0x00);
        cpu.step(&mut bus); // PLA
        assert_eq!(cpu.a, 0x42);
    }

    #[test]
    fn test_cycle_count() {
        let mut bus = with_reset_vector(&[0xA9, 0x42]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        let cycles_before = cpu.cycles;
        cpu.step(&mut bus);
        let cycles_after = cpu.cycles;

        // LDA immediate takes 2 cycles
        assert_eq!(cycles_after - cycles_before, 2);
    }

    #[test]
    fn test_nmi_dispatch_after_instruction_completes() {
        let mut bus = with_reset_vector(&[0xEA, 0xEA]); // NOP, NOP
        bus.memory[0xFFFA] = 0x00;
        bus.memory[0xFFFB] = 0x90; // NMI vector -> $9000

        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.trigger_nmi();
        cpu.step(&mut bus); // NOP completes, then NMI is serviced on next step
        cpu.step(&mut bus);

        assert_eq!(cpu.pc, 0x9000);
        assert!(cpu.status.contains(StatusFlags::INTERRUPT_DISABLE));
    }
}
