// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// A Nios II custom instruction: two 32-bit operands in, one result out.
pub trait CustomInstruction: std::fmt::Debug + Send {
    fn name(&self) -> &str;
    fn execute(&mut self, dataa: u32, datab: u32) -> u32;
}

/// Vector multiply unit. Treats each operand as four unsigned byte lanes and
/// returns their dot product.
#[derive(Debug, Default)]
pub struct VectorMultiply {
    invocations: u64,
}

impl VectorMultiply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

impl CustomInstruction for VectorMultiply {
    fn name(&self) -> &str {
        "vector_mult"
    }

    fn execute(&mut self, dataa: u32, datab: u32) -> u32 {
        self.invocations += 1;
        dataa
            .to_le_bytes()
            .iter()
            .zip(datab.to_le_bytes())
            .map(|(a, b)| *a as u32 * b as u32)
            .sum()
    }
}
