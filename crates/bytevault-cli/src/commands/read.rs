//! Read-side commands

use super::{parse_address, Context};
use crate::{output::Output, CliError};

/// Print the stored content. Text is decompressed when flagged unless `raw`
/// is set, in which case the payload is printed as hex.
pub fn read(ctx: &Context, address: &str, raw: bool, json: bool) -> Result<(), CliError> {
    let unit = parse_address(address)?;
    let reader = ctx.reader();

    if raw {
        let payload = hex::encode(reader.read_payload(&unit)?);
        let payload = format!("0x{}", payload);
        Output::new(json)
            .field("address", &unit.to_hex())
            .field("payload", &payload)
            .message(&payload)
            .print();
    } else {
        let content = reader.read_content(&unit)?;
        Output::new(json)
            .field("address", &unit.to_hex())
            .field("content", &content)
            .message(&content)
            .print();
    }
    Ok(())
}

/// Print the version tag
pub fn version(ctx: &Context, address: &str, json: bool) -> Result<(), CliError> {
    let unit = parse_address(address)?;
    let tag = ctx.reader().version_of(&unit)?.to_text();

    Output::new(json)
        .field("address", &unit.to_hex())
        .field("version", &tag)
        .message(&tag)
        .print();
    Ok(())
}

/// Print the recorded author
pub fn author(ctx: &Context, address: &str, json: bool) -> Result<(), CliError> {
    let unit = parse_address(address)?;
    let author = ctx.reader().author_of(&unit)?.to_hex();

    Output::new(json)
        .field("address", &unit.to_hex())
        .field("author", &author)
        .message(&author)
        .print();
    Ok(())
}

/// Print the compression flag
pub fn compressed(ctx: &Context, address: &str, json: bool) -> Result<(), CliError> {
    let unit = parse_address(address)?;
    let compressed = ctx.reader().is_compressed_of(&unit)?;

    Output::new(json)
        .field("address", &unit.to_hex())
        .field_bool("compressed", compressed)
        .message(&compressed.to_string())
        .print();
    Ok(())
}

/// Print raw code bytes from `offset` on, as hex
pub fn force_read(ctx: &Context, address: &str, offset: usize, json: bool) -> Result<(), CliError> {
    let unit = parse_address(address)?;
    let bytes = format!("0x{}", hex::encode(ctx.reader().force_read_at(&unit, offset)?));

    Output::new(json)
        .field("address", &unit.to_hex())
        .field_u64("offset", offset as u64)
        .field("bytes", &bytes)
        .message(&bytes)
        .print();
    Ok(())
}

/// Print everything the header records
pub fn inspect(ctx: &Context, address: &str, json: bool) -> Result<(), CliError> {
    let unit = parse_address(address)?;
    let info = ctx.reader().describe(&unit)?;
    let version = info.version.to_text();
    let author = info.author.map(|a| a.to_hex());
    let compressed = info.compressed.map(|c| c.to_string());

    let mut output = Output::new(json)
        .field("address", &unit.to_hex())
        .field("version", &version)
        .field_opt("author", author.as_deref())
        .field_u64("payload_len", info.payload_len as u64)
        .field_u64("code_len", info.code_len as u64);
    output = match info.compressed {
        Some(flag) => output.field_bool("compressed", flag),
        None => output.field_opt("compressed", None),
    };

    output
        .message(&format!(
            "Address:    {}\nVersion:    {}\nAuthor:     {}\nCompressed: {}\nPayload:    {} bytes\nCode:       {} bytes",
            unit.to_hex(),
            version,
            author.as_deref().unwrap_or("-"),
            compressed.as_deref().unwrap_or("-"),
            info.payload_len,
            info.code_len
        ))
        .print();
    Ok(())
}
