// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::peripherals::counter::BusCounter;
use crate::peripherals::pio::Pio;
use crate::peripherals::register_file::RegisterFile;
use crate::peripherals::seven_seg::SevenSegment;
use crate::{Peripheral, SimResult, SimulationError};
use sopc_config::{BoardDescriptor, PeripheralConfig};
use std::collections::BTreeMap;

pub struct PeripheralEntry {
    pub name: String,
    pub base: u64,
    pub size: u64,
    pub dev: Box<dyn Peripheral>,
}

impl PeripheralEntry {
    fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr - self.base < self.size
    }
}

/// Avalon-style system interconnect: decodes addresses onto the peripheral
/// windows described by a board descriptor.
#[derive(Default)]
pub struct SystemBus {
    pub peripherals: Vec<PeripheralEntry>,
}

fn build_peripheral(p_cfg: &PeripheralConfig) -> Option<Box<dyn Peripheral>> {
    let width = p_cfg.option_u64("width").unwrap_or(32) as u8;
    let dev: Box<dyn Peripheral> = match p_cfg.r#type.as_str() {
        "pio_out" => Box::new(Pio::output(width)),
        "pio_in" => {
            let initial = p_cfg.option_u64("inputs").unwrap_or(0) as u32;
            Box::new(Pio::input(width, initial))
        }
        "seven_seg" => Box::new(SevenSegment::new()),
        "counter" => Box::new(BusCounter::new()),
        "register_file" => {
            let words = p_cfg
                .option_u64("words")
                .unwrap_or(p_cfg.registers.len().max(4) as u64);
            Box::new(RegisterFile::new(words as usize))
        }
        other => {
            tracing::warn!(
                "Unsupported peripheral type '{}' for id '{}'; skipping",
                other,
                p_cfg.id
            );
            return None;
        }
    };
    Some(dev)
}

impl SystemBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(board: &BoardDescriptor) -> anyhow::Result<Self> {
        let mut bus = Self::new();

        for p_cfg in &board.peripherals {
            let Some(dev) = build_peripheral(p_cfg) else {
                continue;
            };
            let size = p_cfg.window_size()?;
            tracing::debug!(
                "Mapped {} ({}) at {:#010x}..{:#010x}",
                p_cfg.id,
                p_cfg.r#type,
                p_cfg.base_address,
                p_cfg.base_address.saturating_add(size)
            );
            bus.add_peripheral(&p_cfg.id, p_cfg.base_address, size, dev);
        }

        tracing::info!(
            "Board '{}': {} peripherals mapped",
            board.name,
            bus.peripherals.len()
        );
        Ok(bus)
    }

    pub fn add_peripheral(&mut self, name: &str, base: u64, size: u64, dev: Box<dyn Peripheral>) {
        self.peripherals.push(PeripheralEntry {
            name: name.to_string(),
            base,
            size,
            dev,
        });
    }

    pub fn peripheral(&self, name: &str) -> Option<&dyn Peripheral> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.dev.as_ref())
    }

    /// Typed view of a named peripheral, if it has the requested model.
    pub fn peripheral_as<T: 'static>(&self, name: &str) -> Option<&T> {
        self.peripheral(name)?.as_any()?.downcast_ref::<T>()
    }

    /// Drive the pins of an input PIO, as flipping the board switches would.
    pub fn set_pio_input(&mut self, name: &str, value: u32) -> bool {
        for p in &mut self.peripherals {
            if p.name != name {
                continue;
            }
            let Some(any) = p.dev.as_any_mut() else {
                continue;
            };
            let Some(pio) = any.downcast_mut::<Pio>() else {
                continue;
            };
            pio.set_input(value);
            return true;
        }
        false
    }

    pub fn peek_peripheral(&self, name: &str) -> Option<serde_json::Value> {
        self.peripheral(name).map(|p| p.snapshot())
    }

    /// State of every peripheral, keyed by name.
    pub fn snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        self.peripherals
            .iter()
            .map(|p| (p.name.clone(), p.dev.snapshot()))
            .collect()
    }

    fn decode(&self, addr: u64) -> Option<&PeripheralEntry> {
        self.peripherals
            .iter()
            .find(|p| p.contains(addr))
    }
}

impl crate::Bus for SystemBus {
    fn read_u8(&self, addr: u64) -> SimResult<u8> {
        match self.decode(addr) {
            Some(p) => p.dev.read(addr - p.base),
            None => Err(SimulationError::MemoryViolation(addr)),
        }
    }

    fn write_u8(&mut self, addr: u64, value: u8) -> SimResult<()> {
        for p in &mut self.peripherals {
            if p.contains(addr) {
                return p.dev.write(addr - p.base, value);
            }
        }
        Err(SimulationError::MemoryViolation(addr))
    }

    fn tick_peripherals(&mut self, cycles: u64) {
        for p in &mut self.peripherals {
            p.dev.tick(cycles);
        }
    }
}
