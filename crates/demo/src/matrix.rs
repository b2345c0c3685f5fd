// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! 4x4 byte matrix demo: the same product computed with a software loop and
//! with the vector-multiply custom instruction.

use sopc_core::custom::CustomInstruction;
use std::fmt;

/// Matrix size
pub const MSIZE: usize = 4;

/// Four unsigned byte components that travel as one 32-bit word.
///
/// Packing is little-endian: component 0 occupies bits 7:0 and component 3
/// bits 31:24, matching the Nios II byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector4([u8; MSIZE]);

impl Vector4 {
    pub const fn from_components(components: [u8; MSIZE]) -> Self {
        Self(components)
    }

    pub const fn from_word(word: u32) -> Self {
        Self(word.to_le_bytes())
    }

    pub const fn to_word(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    pub fn components(&self) -> [u8; MSIZE] {
        self.0
    }

    pub fn component(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn set_component(&mut self, index: usize, value: u8) {
        self.0[index] = value;
    }
}

/// Four rows of `Vector4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Matrix4 {
    rows: [Vector4; MSIZE],
}

impl Matrix4 {
    pub const fn from_words(words: [u32; MSIZE]) -> Self {
        Self {
            rows: [
                Vector4::from_word(words[0]),
                Vector4::from_word(words[1]),
                Vector4::from_word(words[2]),
                Vector4::from_word(words[3]),
            ],
        }
    }

    pub fn row(&self, index: usize) -> Vector4 {
        self.rows[index]
    }

    pub fn rows(&self) -> &[Vector4; MSIZE] {
        &self.rows
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix :")?;
        for row in &self.rows {
            let [c0, c1, c2, c3] = row.components();
            writeln!(f, "{:2} {:2} {:2} {:2}", c0, c1, c2, c3)?;
        }
        Ok(())
    }
}

/// Which implementation `mult` runs, selected by its numeric argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplyPath {
    Software,
    Hardware,
}

impl MultiplyPath {
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            1 => Some(Self::Software),
            2 => Some(Self::Hardware),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Software => "SW",
            Self::Hardware => "HW",
        }
    }
}

/// The fixed demo inputs. `B` is stored transposed: row `c` of `B` is
/// column `c` of the right-hand operand.
pub fn set_input_matrices() -> (Matrix4, Matrix4) {
    let a = Matrix4::from_words([0x0403_0201, 0x0807_0605, 0x0C0B_0A09, 0x100F_0E0D]);
    let b = Matrix4::from_words([0x0101_0101, 0x0202_0202, 0x0303_0303, 0x0404_0404]);
    (a, b)
}

/// `P[row][col] = sum_k A[row][k] * B[col][k]`, accumulated in 8 bits.
/// Elements wrap past 255.
pub fn multiply_software(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let mut p = Matrix4::default();
    for row in 0..MSIZE {
        for col in 0..MSIZE {
            let mut acc = 0u8;
            for k in 0..MSIZE {
                acc = acc.wrapping_add(a.rows[row].0[k].wrapping_mul(b.rows[col].0[k]));
            }
            p.rows[row].0[col] = acc;
        }
    }
    p
}

/// Same product, one custom instruction per element. The instruction result
/// is truncated to the 8-bit element.
pub fn multiply_hardware(a: &Matrix4, b: &Matrix4, unit: &mut dyn CustomInstruction) -> Matrix4 {
    let mut p = Matrix4::default();
    for row in 0..MSIZE {
        for col in 0..MSIZE {
            let word = unit.execute(a.rows[row].to_word(), b.rows[col].to_word());
            p.rows[row].0[col] = word as u8;
        }
    }
    p
}
