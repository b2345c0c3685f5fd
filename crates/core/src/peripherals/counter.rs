// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::byte_lane;
use crate::SimResult;

/// Memory-mapped bus counter. Reading word 0 returns the count, writing it
/// sets the enable bit.
#[derive(Debug, Default, serde::Serialize)]
pub struct BusCounter {
    count: u32,
    enabled: bool,
}

impl BusCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl crate::Peripheral for BusCounter {
    fn read(&self, offset: u64) -> SimResult<u8> {
        let val = if offset & !3 == 0 { self.count } else { 0 };
        Ok(byte_lane(val, offset))
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        // Only bit 0 of the low byte is wired.
        if offset == 0 {
            self.enabled = (value & 1) != 0;
        }
        Ok(())
    }

    fn tick(&mut self, cycles: u64) {
        if self.enabled {
            self.count = self.count.wrapping_add(cycles as u32);
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::BusCounter;
    use crate::Peripheral;

    #[test]
    fn test_counts_only_while_enabled() {
        let mut counter = BusCounter::new();
        counter.tick(100);
        assert_eq!(counter.count(), 0);

        counter.write(0x00, 0x01).unwrap();
        counter.tick(100);
        counter.tick(5);
        assert_eq!(counter.count(), 105);

        counter.write(0x00, 0x00).unwrap();
        counter.tick(100);
        assert_eq!(counter.count(), 105);
        assert_eq!(counter.read(0x00).unwrap(), 105);
    }

    #[test]
    fn test_count_wraps() {
        let mut counter = BusCounter::new();
        counter.write(0x00, 0x01).unwrap();
        counter.tick(u32::MAX as u64);
        counter.tick(2);
        assert_eq!(counter.count(), 1);
    }
}
