// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{byte_lane, merge_byte_lane};
use crate::SimResult;

/// Segment patterns (bit 0 = a ... bit 6 = g, active high) for nibbles 0-F.
const GLYPHS: [u8; 16] = [
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, // 0-7
    0x7F, 0x6F, 0x77, 0x7C, 0x39, 0x5E, 0x79, 0x71, // 8-F
];

/// Four-digit BCD-to-seven-segment display. Register 0 holds one nibble per
/// digit, units in bits 3:0.
#[derive(Debug, Default, serde::Serialize)]
pub struct SevenSegment {
    bcd: u32,
}

impl SevenSegment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bcd(&self) -> u32 {
        self.bcd
    }

    /// Digit nibbles, thousands first.
    pub fn digits(&self) -> [u8; 4] {
        [
            ((self.bcd >> 12) & 0xF) as u8,
            ((self.bcd >> 8) & 0xF) as u8,
            ((self.bcd >> 4) & 0xF) as u8,
            (self.bcd & 0xF) as u8,
        ]
    }

    /// Segment patterns driven onto the four digits, thousands first.
    pub fn segments(&self) -> [u8; 4] {
        self.digits().map(|d| GLYPHS[d as usize])
    }

    /// What a person reading the display would see.
    pub fn text(&self) -> String {
        self.digits()
            .iter()
            .map(|d| char::from_digit(*d as u32, 16).unwrap_or('?').to_ascii_uppercase())
            .collect()
    }
}

impl crate::Peripheral for SevenSegment {
    fn read(&self, offset: u64) -> SimResult<u8> {
        let val = if offset & !3 == 0 { self.bcd } else { 0 };
        Ok(byte_lane(val, offset))
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        if offset & !3 == 0 {
            self.bcd = merge_byte_lane(self.bcd, offset, value) & 0xFFFF;
        }
        Ok(())
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "bcd": self.bcd,
            "text": self.text(),
            "segments": self.segments(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SevenSegment;
    use crate::Peripheral;

    #[test]
    fn test_display_renders_digits() {
        let mut seg = SevenSegment::new();
        seg.write(0x00, 0x34).unwrap();
        seg.write(0x01, 0x12).unwrap();
        assert_eq!(seg.bcd(), 0x1234);
        assert_eq!(seg.text(), "1234");
        assert_eq!(seg.segments(), [0x06, 0x5B, 0x4F, 0x66]);
    }

    #[test]
    fn test_upper_half_word_is_dropped() {
        let mut seg = SevenSegment::new();
        seg.write(0x02, 0xFF).unwrap();
        assert_eq!(seg.bcd(), 0);
        assert_eq!(seg.text(), "0000");
    }

    #[test]
    fn test_non_decimal_nibbles_show_hex() {
        let mut seg = SevenSegment::new();
        seg.write(0x00, 0xAF).unwrap();
        assert_eq!(seg.text(), "00AF");
    }
}
