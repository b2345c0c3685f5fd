// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod bcd;
pub mod console;
pub mod firmware;
pub mod matrix;
pub mod tokens;
pub mod vocabulary;

pub use firmware::{Firmware, FirmwareError, Step};
