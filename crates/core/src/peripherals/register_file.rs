// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{byte_lane, merge_byte_lane};
use crate::SimResult;

/// Plain read-back registers. Stands in for the audio processing blocks
/// (mute, LMS filter, delay line) and the codec interface, whose datapaths
/// live in the FPGA fabric and only expose control words to the CPU.
#[derive(Debug, serde::Serialize)]
pub struct RegisterFile {
    words: Vec<u32>,
}

impl RegisterFile {
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0; words.max(1)],
        }
    }

    pub fn word(&self, index: usize) -> Option<u32> {
        self.words.get(index).copied()
    }
}

impl crate::Peripheral for RegisterFile {
    fn read(&self, offset: u64) -> SimResult<u8> {
        let val = self.word((offset / 4) as usize).unwrap_or(0);
        Ok(byte_lane(val, offset))
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        if let Some(word) = self.words.get_mut((offset / 4) as usize) {
            *word = merge_byte_lane(*word, offset, value);
        }
        Ok(())
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
