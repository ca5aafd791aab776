//! # bytevault
//!
//! Command-line interface for versioned bytecode storage.
//!
//! ## Usage
//!
//! ```bash
//! # Store text, bytes or a file
//! bytevault --writer 0x42... write --data "console.log(hello world)"
//! bytevault --writer 0x42... write --file sketch.js --compress
//! bytevault --writer 0x42... write --hex 0xdeadbeef
//!
//! # Inspect a unit
//! bytevault read 0x...
//! bytevault read 0x... --raw
//! bytevault version 0x...
//! bytevault author 0x...
//! bytevault inspect 0x...
//! bytevault force-read 0x... --offset 54
//!
//! # Remove a unit
//! bytevault --writer 0x42... purge 0x...
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

use bytevault_core::FormatVersion;
use commands::Context;

/// bytevault CLI
#[derive(Parser, Debug)]
#[command(name = "bytevault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ~/.bytevault/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Writer address used for write and purge
    #[arg(long, global = true)]
    writer: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Store a payload and print its address
    Write(commands::write::WriteArgs),
    /// Print a unit's content
    Read {
        /// Unit address
        address: String,
        /// Print the stored payload as hex, without decompressing
        #[arg(long)]
        raw: bool,
    },
    /// Print a unit's version tag
    Version {
        /// Unit address
        address: String,
    },
    /// Print a unit's recorded author
    Author {
        /// Unit address
        address: String,
    },
    /// Print a unit's compression flag
    Compressed {
        /// Unit address
        address: String,
    },
    /// Print raw code bytes from an offset, ignoring the format
    ForceRead {
        /// Unit address
        address: String,
        /// Byte offset into the code
        #[arg(long)]
        offset: usize,
    },
    /// Print everything known about a unit
    Inspect {
        /// Unit address
        address: String,
    },
    /// Remove a unit created by the writer
    Purge {
        /// Unit address
        address: String,
    },
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the writer address
        #[arg(long)]
        set_writer: Option<String>,
        /// Set the format new units are written with
        #[arg(long)]
        set_format: Option<FormatVersion>,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        Output::error(json, &e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()
            .ok_or_else(|| CliError::Config("cannot determine config path".to_string()))?,
    };
    let mut config = Config::load(&config_path)?;

    init_tracing(&config.log_level);

    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }
    if let Some(writer) = &cli.writer {
        config.writer = Some(commands::parse_address(writer)?);
    }

    let json = cli.json;
    if let Commands::Config {
        show,
        set_writer,
        set_format,
    } = cli.command
    {
        return handle_config(&mut config, &config_path, show, set_writer, set_format, json);
    }

    let ctx = Context::open(config)?;
    match cli.command {
        Commands::Write(args) => args.execute(&ctx, json),
        Commands::Read { address, raw } => commands::read::read(&ctx, &address, raw, json),
        Commands::Version { address } => commands::read::version(&ctx, &address, json),
        Commands::Author { address } => commands::read::author(&ctx, &address, json),
        Commands::Compressed { address } => commands::read::compressed(&ctx, &address, json),
        Commands::ForceRead { address, offset } => {
            commands::read::force_read(&ctx, &address, offset, json)
        }
        Commands::Inspect { address } => commands::read::inspect(&ctx, &address, json),
        Commands::Purge { address } => commands::write::purge(&ctx, &address, json),
        Commands::Config { .. } => Ok(()),
    }
}

/// Logs go to stderr so command output stays parseable
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn handle_config(
    config: &mut Config,
    path: &std::path::Path,
    show: bool,
    set_writer: Option<String>,
    set_format: Option<FormatVersion>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(writer) = set_writer {
        config.writer = Some(commands::parse_address(&writer)?);
        modified = true;
    }

    if let Some(format) = set_format {
        config.store.format = format;
        modified = true;
    }

    if modified {
        config.store.validate()?;
        config.save(path)?;
        Output::new(json)
            .field("status", "saved")
            .field("path", &path.display().to_string())
            .message("Configuration saved")
            .print();
    } else if show {
        let writer = config.writer.map(|w| w.to_hex());
        let data_dir = config.data_dir()?.display().to_string();
        Output::new(json)
            .field("data_dir", &data_dir)
            .field_opt("writer", writer.as_deref())
            .field("log_level", &config.log_level)
            .field("format", &config.store.format.to_string())
            .field_u64("max_code_size", config.store.max_code_size as u64)
            .field_u64("compression_level", config.store.compression_level as u64)
            .message(&format!(
                "Data dir:   {}\nWriter:     {}\nLog level:  {}\nFormat:     {}\nMax code:   {}\nCompression level: {}",
                data_dir,
                writer.as_deref().unwrap_or("-"),
                config.log_level,
                config.store.format,
                config.store.max_code_size,
                config.store.compression_level
            ))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-writer/--set-format to modify")
            .print();
    }

    Ok(())
}
