// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod counter;
pub mod lcd;
pub mod pio;
pub mod register_file;
pub mod seven_seg;

/// Extract the byte at `offset` (within its word) from a register value.
pub(crate) fn byte_lane(reg_val: u32, offset: u64) -> u8 {
    let byte_offset = (offset % 4) as u32;
    ((reg_val >> (byte_offset * 8)) & 0xFF) as u8
}

/// Replace the byte at `offset` (within its word) in a register value.
pub(crate) fn merge_byte_lane(reg_val: u32, offset: u64, value: u8) -> u32 {
    let byte_offset = (offset % 4) as u32;
    let mask = 0xFF << (byte_offset * 8);
    (reg_val & !mask) | ((value as u32) << (byte_offset * 8))
}
