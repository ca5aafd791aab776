//! # bytevault-format
//!
//! On-chain byte layouts for bytecode storage units.
//!
//! Every unit is `[header][payload]`. The header layout depends on the
//! format version that wrote it:
//!
//! | format  | header                                                   | payload at |
//! |---------|----------------------------------------------------------|-----------:|
//! | V0      | 72-byte legacy gate prologue, author as a 32-byte word   | 104        |
//! | V1      | STOP, 32-byte tag, 20-byte author                        | 53         |
//! | V2      | STOP, 32-byte tag, compression flag, 20-byte author      | 54         |
//! | SSTORE2 | STOP                                                     | 1          |
//!
//! Layouts are plain data ([`FormatDescriptor`]); framing and detection are
//! driven by the descriptor table, so a new version is one more table entry.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod layout;
pub mod sstore2;
mod version;

pub use error::{FormatError, FormatResult};
pub use layout::{
    detect, frame, opcode, AuthorField, FormatDescriptor, FORMAT_V0, FORMAT_V1, FORMAT_V2,
    KNOWN_FORMATS, V0_PROLOGUE,
};
pub use version::{FormatVersion, VersionTag};
