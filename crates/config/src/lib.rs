// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

const LMS_FILTER_BOARD: &str = include_str!("../boards/de2_lms_filter.yaml");
const AUDIO_LOOP_BOARD: &str = include_str!("../boards/de2_audio_loop.yaml");

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    "1.0".to_string()
}

fn default_clock_hz() -> u64 {
    50_000_000
}

fn default_true() -> bool {
    true
}

/// Which firmware image runs on the board. The two images share the
/// register layer and matrix demo but expose different command sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[serde(alias = "lms")]
    LmsFilter,
    #[serde(alias = "loop")]
    AudioLoop,
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let v = value.trim().to_ascii_lowercase();
        match v.as_str() {
            "lms_filter" | "lms-filter" | "lms" => Ok(Self::LmsFilter),
            "audio_loop" | "audio-loop" | "loop" => Ok(Self::AudioLoop),
            _ => Err(format!(
                "unsupported firmware variant '{}'; supported: lms-filter, audio-loop",
                value
            )),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Peripheral '{0}' is not part of the board")]
    UnknownPeripheral(String),
    #[error("Peripheral '{peripheral}' has no register named '{register}'")]
    UnknownRegister {
        peripheral: String,
        register: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RegisterConfig {
    pub name: String,
    /// Word offset from the peripheral base, as used by IORD/IOWR.
    pub offset: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PeripheralConfig {
    pub id: String,
    pub r#type: String, // "pio_out", "pio_in", "seven_seg", "counter", "register_file"
    pub base_address: u64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub registers: Vec<RegisterConfig>,
    #[serde(default)]
    pub config: HashMap<String, serde_yaml::Value>,
}

impl PeripheralConfig {
    pub fn window_size(&self) -> Result<u64> {
        match &self.size {
            Some(size) => parse_size(size),
            None => Ok(0x10),
        }
    }

    /// Integer option from the `config` map, e.g. `width` or `inputs`.
    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.config.get(key).and_then(|v| v.as_u64())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LcdConfig {
    #[serde(default = "default_lcd_device")]
    pub device: String,
    #[serde(default = "default_lcd_rows")]
    pub rows: u8,
    #[serde(default = "default_lcd_cols")]
    pub cols: u8,
}

fn default_lcd_device() -> String {
    "/dev/lcd_0".to_string()
}

fn default_lcd_rows() -> u8 {
    2
}

fn default_lcd_cols() -> u8 {
    16
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            device: default_lcd_device(),
            rows: default_lcd_rows(),
            cols: default_lcd_cols(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BoardDescriptor {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub name: String,
    pub variant: Variant,
    #[serde(default = "default_clock_hz")]
    pub clock_hz: u64,
    /// Whether a timestamp timer is present for the multiply timings.
    #[serde(default = "default_true")]
    pub timestamp: bool,
    #[serde(default)]
    pub lcd: LcdConfig,
    pub peripherals: Vec<PeripheralConfig>,
}

/// Resolved location of one memory-mapped register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterRef {
    pub base: u64,
    pub offset: u32,
}

impl RegisterRef {
    pub fn new(base: u64, offset: u32) -> Self {
        Self { base, offset }
    }

    /// Byte address of the register.
    pub fn address(&self) -> u64 {
        self.base + (self.offset as u64) * 4
    }
}

impl BoardDescriptor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read board descriptor {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid board descriptor {:?}", path))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let board: Self =
            serde_yaml::from_str(yaml).context("Failed to parse Board Descriptor YAML")?;
        board.validate()?;
        Ok(board)
    }

    /// The board shipped with the given firmware image.
    pub fn builtin(variant: Variant) -> Result<Self> {
        let yaml = match variant {
            Variant::LmsFilter => LMS_FILTER_BOARD,
            Variant::AudioLoop => AUDIO_LOOP_BOARD,
        };
        Self::from_yaml(yaml).with_context(|| format!("Built-in board for {:?}", variant))
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            bail!(
                "Unsupported schema_version '{}' (expected \"1.0\")",
                self.schema_version
            );
        }
        if self.clock_hz == 0 {
            bail!("clock_hz must be greater than zero");
        }

        let mut ids = HashSet::new();
        let mut windows = Vec::with_capacity(self.peripherals.len());
        for p in &self.peripherals {
            if !ids.insert(p.id.as_str()) {
                bail!("Duplicate peripheral id '{}'", p.id);
            }

            let size = p.window_size()?;
            if size == 0 {
                bail!("Peripheral '{}' has an empty address window", p.id);
            }
            for reg in &p.registers {
                if (reg.offset as u64 + 1) * 4 > size {
                    bail!(
                        "Register '{}.{}' at word offset {} lies outside the {}-byte window",
                        p.id,
                        reg.name,
                        reg.offset,
                        size
                    );
                }
            }
            let Some(end) = p.base_address.checked_add(size) else {
                bail!("Peripheral '{}' window overflows the address space", p.id);
            };
            windows.push((p.base_address, end, p.id.as_str()));
        }

        windows.sort_by_key(|w| w.0);
        for pair in windows.windows(2) {
            let (_, end, first) = pair[0];
            let (start, _, second) = pair[1];
            if start < end {
                bail!(
                    "Peripheral '{}' overlaps '{}' at {:#x}",
                    second,
                    first,
                    start
                );
            }
        }

        Ok(())
    }

    pub fn peripheral(&self, id: &str) -> Option<&PeripheralConfig> {
        self.peripherals.iter().find(|p| p.id == id)
    }

    pub fn register(&self, peripheral: &str, register: &str) -> Result<RegisterRef, ConfigError> {
        let p = self
            .peripheral(peripheral)
            .ok_or_else(|| ConfigError::UnknownPeripheral(peripheral.to_string()))?;
        let reg = p
            .registers
            .iter()
            .find(|r| r.name == register)
            .ok_or_else(|| ConfigError::UnknownRegister {
                peripheral: peripheral.to_string(),
                register: register.to_string(),
            })?;
        Ok(RegisterRef::new(p.base_address, reg.offset))
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}
