//! Write and purge commands

use clap::{ArgGroup, Args};
use std::path::PathBuf;

use super::{parse_address, Context};
use crate::{output::Output, CliError};

/// Arguments for `bytevault write`
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["data", "file", "hex"])))]
pub struct WriteArgs {
    /// Text to store
    #[arg(long)]
    data: Option<String>,
    /// Read the payload from a file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Hex-encoded payload
    #[arg(long)]
    hex: Option<String>,
    /// DEFLATE the text before storing it
    #[arg(long)]
    compress: bool,
}

enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl WriteArgs {
    fn payload(self) -> Result<Payload, CliError> {
        if let Some(text) = self.data {
            return Ok(Payload::Text(text));
        }
        if let Some(path) = self.file {
            let bytes = std::fs::read(&path)?;
            return Ok(match String::from_utf8(bytes) {
                Ok(text) => Payload::Text(text),
                Err(e) => Payload::Bytes(e.into_bytes()),
            });
        }
        let hex_str = self.hex.unwrap_or_default();
        let bytes = hex::decode(hex_str.trim().trim_start_matches("0x"))
            .map_err(|e| CliError::InvalidHex(e.to_string()))?;
        Ok(Payload::Bytes(bytes))
    }

    pub fn execute(self, ctx: &Context, json: bool) -> Result<(), CliError> {
        let writer = ctx.writer()?;
        let compress = self.compress;
        let (unit, len) = match self.payload()? {
            Payload::Text(text) if compress => (writer.write_compressed(&text)?, text.len()),
            Payload::Text(text) => (writer.write_string(&text)?, text.len()),
            Payload::Bytes(_) if compress => {
                return Err(CliError::InvalidInput(
                    "--compress needs UTF-8 text".to_string(),
                ))
            }
            Payload::Bytes(bytes) => (writer.write(&bytes)?, bytes.len()),
        };

        Output::new(json)
            .field("address", &unit.to_hex())
            .field("writer", &writer.address().to_hex())
            .field("format", &writer.format().to_string())
            .field_u64("length", len as u64)
            .field_bool("compressed", compress)
            .field_bool("success", true)
            .message(&unit.to_hex())
            .print();
        Ok(())
    }
}

/// Purge a unit created by the configured writer
pub fn purge(ctx: &Context, address: &str, json: bool) -> Result<(), CliError> {
    let unit = parse_address(address)?;
    let writer = ctx.writer()?;
    writer.purge(&unit)?;

    Output::new(json)
        .field("address", &unit.to_hex())
        .field("status", "purged")
        .field_bool("success", true)
        .message(&format!("Purged {}", unit.to_hex()))
        .print();
    Ok(())
}
