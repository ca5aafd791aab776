//! SSTORE2 interop.
//!
//! SSTORE2 stores data as code behind a single STOP byte and records no
//! version or author. Units written this way are not produced by any framer
//! here, but readers degrade to this layout when nothing else matches.

use crate::layout::opcode::STOP;

/// Offset of the first data byte
pub const DATA_OFFSET: usize = 1;

/// Runtime code SSTORE2 would deploy for `data`
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut code = Vec::with_capacity(DATA_OFFSET + data.len());
    code.push(STOP);
    code.extend_from_slice(data);
    code
}

/// Data stored in SSTORE2-shaped `code`, or `None` if the leading STOP is missing
pub fn payload(code: &[u8]) -> Option<&[u8]> {
    match code.first() {
        Some(&STOP) => Some(&code[DATA_OFFSET..]),
        _ => None,
    }
}
