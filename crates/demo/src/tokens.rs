// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::collections::VecDeque;
use std::io::{self, BufRead, Read};

/// Longest token kept; the console buffer holds 100 bytes including the
/// terminator.
pub const MAX_TOKEN_LEN: usize = 99;

/// Upper bound on one read from the underlying stream. Lines longer than
/// this are consumed in several reads.
const READ_CHUNK: u64 = 4096;

/// Bytes kept of a word while it is being assembled. Leaves room for
/// multi-byte characters before the final cut to `MAX_TOKEN_LEN`.
const WORD_BYTES: usize = MAX_TOKEN_LEN * 4;

/// Splits a line-oriented input stream into whitespace-delimited words,
/// the way `scanf(" %s")` consumes a serial console.
///
/// Input is taken as raw bytes. Invalid UTF-8 becomes U+FFFD, so line
/// noise shows up as an unknown word instead of an I/O error.
pub struct TokenReader<R> {
    reader: R,
    pending: VecDeque<String>,
    word: Vec<u8>,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            word: Vec::new(),
        }
    }

    /// Next word, blocking for more input as needed. `Ok(None)` at end of
    /// input.
    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let mut chunk = Vec::new();
            let read = (&mut self.reader)
                .take(READ_CHUNK)
                .read_until(b'\n', &mut chunk)?;
            if read == 0 {
                self.finish_word();
                if self.pending.is_empty() {
                    return Ok(None);
                }
                continue;
            }

            for byte in chunk {
                if is_space(byte) {
                    self.finish_word();
                } else if self.word.len() < WORD_BYTES {
                    self.word.push(byte);
                }
            }
        }
    }

    fn finish_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word = String::from_utf8_lossy(&self.word);
        self.pending.push_back(truncate_token(&word));
        self.word.clear();
    }
}

/// `isspace` in the C locale.
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

fn truncate_token(word: &str) -> String {
    if word.len() <= MAX_TOKEN_LEN {
        return word.to_string();
    }
    let mut end = MAX_TOKEN_LEN;
    while !word.is_char_boundary(end) {
        end -= 1;
    }
    word[..end].to_string()
}
