// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{byte_lane, merge_byte_lane};
use crate::SimResult;

const PIO_DATA: u64 = 0x00;
const PIO_DIRECTION: u64 = 0x04;
const PIO_IRQ_MASK: u64 = 0x08;
const PIO_EDGE_CAPTURE: u64 = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PioDirection {
    Output,
    Input,
}

/// Avalon parallel I/O port. Output ports drive LEDs, input ports sample
/// switches.
#[derive(Debug, serde::Serialize)]
pub struct Pio {
    direction_kind: PioDirection,
    width: u8,
    data: u32,         // 0x00: data register
    direction: u32,    // 0x04: direction register (bidirectional ports only)
    irq_mask: u32,     // 0x08: interrupt mask
    edge_capture: u32, // 0x0C: edge capture, any write clears
}

impl Pio {
    pub fn output(width: u8) -> Self {
        Self::new(PioDirection::Output, width)
    }

    pub fn input(width: u8, initial: u32) -> Self {
        let mut pio = Self::new(PioDirection::Input, width);
        pio.data = initial & pio.mask();
        pio
    }

    fn new(direction_kind: PioDirection, width: u8) -> Self {
        Self {
            direction_kind,
            width: width.clamp(1, 32),
            data: 0,
            direction: 0,
            irq_mask: 0,
            edge_capture: 0,
        }
    }

    fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Current value on the port pins.
    pub fn value(&self) -> u32 {
        self.data
    }

    /// Drive the input pins, latching any changed bits into edge capture.
    pub fn set_input(&mut self, value: u32) {
        let value = value & self.mask();
        self.edge_capture |= self.data ^ value;
        self.data = value;
    }

    pub fn irq_pending(&self) -> bool {
        (self.edge_capture & self.irq_mask) != 0
    }

    fn read_reg(&self, offset: u64) -> u32 {
        match offset {
            PIO_DATA => self.data,
            PIO_DIRECTION => self.direction,
            PIO_IRQ_MASK => self.irq_mask,
            PIO_EDGE_CAPTURE => self.edge_capture,
            _ => 0,
        }
    }

    fn write_reg(&mut self, offset: u64, value: u32) {
        match offset {
            PIO_DATA => {
                // Input ports ignore writes to the data register.
                if self.direction_kind == PioDirection::Output {
                    self.data = value & self.mask();
                }
            }
            PIO_DIRECTION => self.direction = value & self.mask(),
            PIO_IRQ_MASK => self.irq_mask = value & self.mask(),
            _ => {}
        }
    }
}

impl crate::Peripheral for Pio {
    fn read(&self, offset: u64) -> SimResult<u8> {
        Ok(byte_lane(self.read_reg(offset & !3), offset))
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        let reg_offset = offset & !3;
        if reg_offset == PIO_EDGE_CAPTURE {
            let shift = (offset % 4) * 8;
            self.edge_capture &= !(0xFF << shift);
            return Ok(());
        }
        let reg_val = merge_byte_lane(self.read_reg(reg_offset), offset, value);
        self.write_reg(reg_offset, reg_val);
        Ok(())
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(fields) = value.as_object_mut() {
            fields.insert("irq_pending".to_string(), self.irq_pending().into());
        }
        value
    }
}
