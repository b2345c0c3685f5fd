// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

const ESC: u8 = 0x1B;

#[derive(Debug, Clone, PartialEq, Eq)]
enum EscapeState {
    Text,
    Escape,
    Csi(Vec<u8>),
}

/// Character LCD behind a stream driver. Understands the VT100 subset the
/// driver accepts: `ESC[2J`, `ESC[K` and `ESC[<row>;<col>H`.
#[derive(Debug)]
pub struct CharacterLcd {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<u8>>,
    row: usize,
    col: usize,
    state: EscapeState,
}

impl CharacterLcd {
    pub fn new(rows: u8, cols: u8) -> Self {
        let rows = rows.max(1) as usize;
        let cols = cols.max(1) as usize;
        Self {
            rows,
            cols,
            cells: vec![vec![b' '; cols]; rows],
            row: 0,
            col: 0,
            state: EscapeState::Text,
        }
    }

    /// Row contents with trailing blanks removed.
    pub fn lines(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| String::from_utf8_lossy(row).trim_end().to_string())
            .collect()
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(b' ');
        }
    }

    fn put(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                self.row = (self.row + 1) % self.rows;
                self.col = 0;
            }
            b'\r' => self.col = 0,
            _ => {
                if self.col < self.cols {
                    self.cells[self.row][self.col] = byte;
                    self.col += 1;
                }
            }
        }
    }

    fn apply_csi(&mut self, params: &[u8], command: u8) {
        let params = String::from_utf8_lossy(params);
        let mut numbers = params.split(';').map(|p| p.parse::<usize>().ok());
        match command {
            b'J' => {
                if params == "2" {
                    self.clear();
                }
            }
            b'K' => {
                let row = self.row;
                self.cells[row][self.col..].fill(b' ');
            }
            b'H' => {
                let row = numbers.next().flatten().unwrap_or(1);
                let col = numbers.next().flatten().unwrap_or(1);
                self.row = row.clamp(1, self.rows) - 1;
                self.col = col.clamp(1, self.cols) - 1;
            }
            other => tracing::trace!("LCD: ignoring escape sequence '{}'", other as char),
        }
    }

    pub fn feed(&mut self, byte: u8) {
        let state = std::mem::replace(&mut self.state, EscapeState::Text);
        self.state = match state {
            EscapeState::Text if byte == ESC => EscapeState::Escape,
            EscapeState::Text => {
                self.put(byte);
                EscapeState::Text
            }
            EscapeState::Escape if byte == b'[' => EscapeState::Csi(Vec::new()),
            EscapeState::Escape => EscapeState::Text,
            EscapeState::Csi(mut params) => {
                if byte.is_ascii_digit() || byte == b';' {
                    params.push(byte);
                    EscapeState::Csi(params)
                } else {
                    self.apply_csi(&params, byte);
                    EscapeState::Text
                }
            }
        };
    }
}

/// Shared, writable handle to a simulated LCD, in the same way UART output is
/// captured into a shared sink.
#[derive(Debug, Clone)]
pub struct LcdHandle {
    inner: Arc<Mutex<CharacterLcd>>,
}

impl LcdHandle {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CharacterLcd::new(rows, cols))),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|lcd| lcd.lines())
            .unwrap_or_default()
    }
}

impl Write for LcdHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut lcd = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "LCD state poisoned"))?;
        for byte in buf {
            lcd.feed(*byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let lines = self.lines();
        tracing::debug!("LCD: {:?}", lines);
        Ok(())
    }
}
