// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod bus;
pub mod clock;
pub mod custom;
pub mod peripherals;

use std::any::Any;

pub use sopc_config::RegisterRef;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("Memory access violation at {0:#x}")]
    MemoryViolation(u64),
}

pub type SimResult<T> = Result<T, SimulationError>;

/// Trait representing a memory-mapped peripheral
pub trait Peripheral: std::fmt::Debug + Send {
    fn read(&self, offset: u64) -> SimResult<u8>;
    fn write(&mut self, offset: u64, value: u8) -> SimResult<()>;
    /// Advance the peripheral by `cycles` bus clock cycles.
    fn tick(&mut self, _cycles: u64) {}
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Trait representing the system bus
pub trait Bus {
    fn read_u8(&self, addr: u64) -> SimResult<u8>;
    fn write_u8(&mut self, addr: u64, value: u8) -> SimResult<()>;
    fn tick_peripherals(&mut self, cycles: u64);

    fn read_u32(&self, addr: u64) -> SimResult<u32> {
        let b0 = self.read_u8(addr)? as u32;
        let b1 = self.read_u8(addr + 1)? as u32;
        let b2 = self.read_u8(addr + 2)? as u32;
        let b3 = self.read_u8(addr + 3)? as u32;
        // Little Endian
        Ok(b0 | (b1 << 8) | (b2 << 16) | (b3 << 24))
    }

    fn write_u32(&mut self, addr: u64, value: u32) -> SimResult<()> {
        self.write_u8(addr, (value & 0xFF) as u8)?;
        self.write_u8(addr + 1, ((value >> 8) & 0xFF) as u8)?;
        self.write_u8(addr + 2, ((value >> 16) & 0xFF) as u8)?;
        self.write_u8(addr + 3, ((value >> 24) & 0xFF) as u8)?;
        Ok(())
    }
}

/// Word-addressed register access in the style of the Nios `IORD`/`IOWR`
/// macros: `offset` counts 32-bit registers from `base`.
///
/// The firmware only talks to hardware through this trait, so a simulated
/// bus or a recording fake can stand in for the real register file.
pub trait RegisterAccess {
    fn read_register(&self, base: u64, offset: u32) -> SimResult<u32>;
    fn write_register(&mut self, base: u64, offset: u32, value: u32) -> SimResult<()>;

    /// Let simulated hardware observe the passage of `cycles` clock cycles.
    fn advance(&mut self, _cycles: u64) {}

    fn read(&self, reg: RegisterRef) -> SimResult<u32> {
        self.read_register(reg.base, reg.offset)
    }

    fn write(&mut self, reg: RegisterRef, value: u32) -> SimResult<()> {
        self.write_register(reg.base, reg.offset, value)
    }
}

impl<T: Bus> RegisterAccess for T {
    fn read_register(&self, base: u64, offset: u32) -> SimResult<u32> {
        self.read_u32(base + (offset as u64) * 4)
    }

    fn write_register(&mut self, base: u64, offset: u32, value: u32) -> SimResult<()> {
        tracing::debug!(
            "IOWR {:#010x}[{}] <- {:#x}",
            base,
            offset,
            value
        );
        self.write_u32(base + (offset as u64) * 4, value)
    }

    fn advance(&mut self, cycles: u64) {
        self.tick_peripherals(cycles);
    }
}
