//! Format descriptors, framing and structural detection

use crate::error::{FormatError, FormatResult};
use crate::version::{FormatVersion, VersionTag};
use bytevault_primitives::Address;
use tracing::trace;

/// EVM opcodes that appear in storage headers
pub mod opcode {
    /// Halts execution; makes a blob inert when called
    pub const STOP: u8 = 0x00;
    /// Copy code to memory
    pub const CODECOPY: u8 = 0x39;
    /// Load word from memory
    pub const MLOAD: u8 = 0x51;
    /// Conditional jump
    pub const JUMPI: u8 = 0x57;
    /// Jump target
    pub const JUMPDEST: u8 = 0x5b;
    /// Push one byte
    pub const PUSH1: u8 = 0x60;
    /// Message sender
    pub const CALLER: u8 = 0x33;
    /// Equality
    pub const EQ: u8 = 0x14;
    /// Destroy the executing account
    pub const SELFDESTRUCT: u8 = 0xff;
}

use opcode::*;

/// Leading 72 bytes of every V0 unit.
///
/// Copies the author word at 0x48 into memory, compares it with CALLER and
/// self-destructs on a match; any other caller stops. Only recognised here,
/// never executed.
pub const V0_PROLOGUE: [u8; 72] = {
    let gate = [
        PUSH1, 0x20, PUSH1, 0x48, PUSH1, 0x00, CODECOPY, // copy author word
        PUSH1, 0x00, MLOAD, CALLER, EQ,                 // author == caller?
        PUSH1, 0x10, JUMPI, STOP,                       // no: halt
        JUMPDEST, CALLER, SELFDESTRUCT,                 // yes: destroy
    ];
    let mut out = [STOP; 72];
    let mut i = 0;
    while i < gate.len() {
        out[i] = gate[i];
        i += 1;
    }
    out
};

/// Where and how a format records the author
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorField {
    /// Not recorded
    Absent,
    /// Raw 20 bytes at the offset
    Packed(usize),
    /// Left-padded 32-byte word at the offset
    Word(usize),
}

/// Byte layout of one format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Version this layout belongs to
    pub version: FormatVersion,
    /// Bytes every unit of this format starts with
    pub marker: &'static [u8],
    /// Offset of the stored version tag, if the format stores one
    pub tag_offset: Option<usize>,
    /// Offset of the compression flag byte, if the format has one
    pub flag_offset: Option<usize>,
    /// Author location
    pub author: AuthorField,
    /// First payload byte
    pub data_offset: usize,
}

/// Legacy untagged layout
pub static FORMAT_V0: FormatDescriptor = FormatDescriptor {
    version: FormatVersion::V0,
    marker: &V0_PROLOGUE,
    tag_offset: None,
    flag_offset: None,
    author: AuthorField::Word(72),
    data_offset: 104,
};

/// STOP, tag, author
pub static FORMAT_V1: FormatDescriptor = FormatDescriptor {
    version: FormatVersion::V1,
    marker: &[STOP],
    tag_offset: Some(1),
    flag_offset: None,
    author: AuthorField::Packed(33),
    data_offset: 53,
};

/// STOP, tag, compression flag, author
pub static FORMAT_V2: FormatDescriptor = FormatDescriptor {
    version: FormatVersion::V2,
    marker: &[STOP],
    tag_offset: Some(1),
    flag_offset: Some(33),
    author: AuthorField::Packed(34),
    data_offset: 54,
};

/// Every known layout, newest first
pub static KNOWN_FORMATS: [&FormatDescriptor; 3] = [&FORMAT_V2, &FORMAT_V1, &FORMAT_V0];

impl FormatDescriptor {
    /// Descriptor for a version
    pub fn of(version: FormatVersion) -> &'static FormatDescriptor {
        match version {
            FormatVersion::V0 => &FORMAT_V0,
            FormatVersion::V1 => &FORMAT_V1,
            FormatVersion::V2 => &FORMAT_V2,
        }
    }

    /// Tag reported for units of this layout
    pub fn tag(&self) -> VersionTag {
        self.version.tag()
    }

    /// Header length in bytes
    pub fn header_len(&self) -> usize {
        self.data_offset
    }

    /// Whether the layout records a compression flag
    pub fn has_compression_flag(&self) -> bool {
        self.flag_offset.is_some()
    }

    /// Whether the layout records an author
    pub fn records_author(&self) -> bool {
        self.author != AuthorField::Absent
    }

    /// Largest payload that fits in `max_code_size` bytes of code
    pub fn max_payload(&self, max_code_size: usize) -> usize {
        max_code_size.saturating_sub(self.data_offset)
    }

    /// Frame `payload` under this layout
    pub fn frame(&self, payload: &[u8], compressed: bool, author: &Address) -> FormatResult<Vec<u8>> {
        if payload.is_empty() {
            return Err(FormatError::OnlyNonEmptyBytes);
        }
        if compressed && self.flag_offset.is_none() {
            return Err(FormatError::CompressionUnsupported(self.version));
        }

        let mut out = Vec::with_capacity(self.data_offset + payload.len());
        out.resize(self.data_offset, STOP);
        out[..self.marker.len()].copy_from_slice(self.marker);
        if let Some(offset) = self.tag_offset {
            out[offset..offset + VersionTag::LEN].copy_from_slice(self.tag().as_bytes());
        }
        if let Some(offset) = self.flag_offset {
            out[offset] = compressed as u8;
        }
        match self.author {
            AuthorField::Absent => {}
            AuthorField::Packed(offset) => {
                out[offset..offset + Address::LEN].copy_from_slice(author.as_bytes())
            }
            AuthorField::Word(offset) => {
                out[offset..offset + Address::WORD_LEN].copy_from_slice(&author.to_word())
            }
        }
        out.extend_from_slice(payload);
        Ok(out)
    }

    /// Structural check: does `code` parse under this layout?
    pub fn matches(&self, code: &[u8]) -> bool {
        if code.len() < self.data_offset || !code.starts_with(self.marker) {
            return false;
        }
        if let Some(offset) = self.tag_offset {
            if !self.tag().matches(&code[offset..offset + VersionTag::LEN]) {
                return false;
            }
        }
        if let Some(offset) = self.flag_offset {
            if code[offset] > 1 {
                return false;
            }
        }
        if let AuthorField::Word(offset) = self.author {
            if Address::from_word(&code[offset..offset + Address::WORD_LEN]).is_err() {
                return false;
            }
        }
        true
    }

    /// Author recorded in `code`. `code` must already match this layout.
    pub fn author(&self, code: &[u8]) -> Option<Address> {
        match self.author {
            AuthorField::Absent => None,
            AuthorField::Packed(offset) => {
                Address::from_slice(code.get(offset..offset + Address::LEN)?).ok()
            }
            AuthorField::Word(offset) => {
                Address::from_word(code.get(offset..offset + Address::WORD_LEN)?).ok()
            }
        }
    }

    /// Compression flag recorded in `code`, if the layout has one
    pub fn compression_flag(&self, code: &[u8]) -> Option<bool> {
        self.flag_offset
            .and_then(|offset| code.get(offset))
            .map(|flag| *flag == 1)
    }

    /// Payload slice of `code`
    pub fn payload<'a>(&self, code: &'a [u8]) -> &'a [u8] {
        code.get(self.data_offset..).unwrap_or_default()
    }
}

/// Frame `payload` with the layout of `version`
pub fn frame(
    payload: &[u8],
    version: FormatVersion,
    compressed: bool,
    author: &Address,
) -> FormatResult<Vec<u8>> {
    FormatDescriptor::of(version).frame(payload, compressed, author)
}

/// First layout in `formats` that `code` structurally matches
pub fn detect<'f>(code: &[u8], formats: &[&'f FormatDescriptor]) -> Option<&'f FormatDescriptor> {
    let found = formats.iter().copied().find(|d| d.matches(code));
    trace!(
        code_len = code.len(),
        version = ?found.map(|d| d.version),
        "format detection"
    );
    found
}
