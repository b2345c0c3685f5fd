// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Batch conversion of decimal sample files into `%08X` lines, the format
//! used to initialise FPGA memories.

use anyhow::Context;
use sopc_demo::tokens::TokenReader;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum Int2HexError {
    #[error("invalid integer '{token}' (value #{index})")]
    InvalidToken { token: String, index: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convert every whitespace-delimited `i32` in `input` to an uppercase
/// 8-digit hex line. Negative values print as their 32-bit two's complement.
/// Returns the number of values written.
pub fn convert<R: BufRead, W: Write>(input: R, output: &mut W) -> Result<usize, Int2HexError> {
    let mut tokens = TokenReader::new(input);
    let mut count = 0;
    while let Some(token) = tokens.next_token()? {
        let value: i32 = token.parse().map_err(|_| Int2HexError::InvalidToken {
            token: token.clone(),
            index: count + 1,
        })?;
        writeln!(output, "{:08X}", value as u32)?;
        count += 1;
    }
    output.flush()?;
    Ok(count)
}

pub fn convert_files(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let reader = File::open(input)
        .with_context(|| format!("Failed to open input file {:?}", input))?;
    let writer = File::create(output)
        .with_context(|| format!("Failed to create output file {:?}", output))?;

    let mut writer = BufWriter::new(writer);
    let count = convert(BufReader::new(reader), &mut writer)
        .with_context(|| format!("Failed to convert {:?}", input))?;
    tracing::info!("Converted {} values from {:?} to {:?}", count, input, output);
    Ok(count)
}
