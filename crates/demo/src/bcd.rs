// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// Pack the low four decimal digits of `value` into BCD nibbles, units in
/// bits 3:0. Digits above the thousands are dropped.
pub fn encode_bcd(value: u32) -> u32 {
    let mut remaining = value;
    let mut packed = 0;
    for shift in [0, 4, 8, 12] {
        packed |= (remaining % 10) << shift;
        remaining /= 10;
    }
    packed
}

/// Inverse of [`encode_bcd`]. Returns `None` if any nibble is not a decimal
/// digit or bits above the fourth digit are set.
pub fn decode_bcd(packed: u32) -> Option<u32> {
    if packed > 0xFFFF {
        return None;
    }
    let mut value = 0;
    for shift in [12, 8, 4, 0] {
        let digit = (packed >> shift) & 0xF;
        if digit > 9 {
            return None;
        }
        value = value * 10 + digit;
    }
    Some(value)
}
