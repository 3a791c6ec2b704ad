//! fsio CLI - low-level file I/O from the command line
//!
//! Every subcommand goes through the `FileSystem` facade over the native
//! backend, wrapped in the tracing decorator.

use clap::{Parser, Subcommand};
use fsio_config::LogLevel;
use fsio_fs::{FileSystem, LoggedBackend, NativeBackend};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

mod commands;
mod config;
mod error;
mod logging;

use crate::commands::Runner;
use crate::config::{config, init_config, load_config};
use crate::error::{CliError, CliResult};
use crate::logging::LogFormat;

#[derive(Parser)]
#[command(name = "fsio", about = "Low-level file I/O through the fsio facade", version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Global log level: off (or silent), error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[arg(long, value_enum, default_value = "compact", global = true)]
    log_format: LogFormat,

    /// Also append log events to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Use direct buffers (positioned I/O) instead of heap buffers
    #[arg(long, global = true)]
    direct: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a file, or a window of it
    Cat {
        path: String,
        /// First byte to print
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Number of bytes to print (default: to end of file)
        #[arg(long)]
        length: Option<u64>,
    },
    /// Overwrite the start of an existing file with TEXT
    Write { path: String, text: String },
    /// Show file metadata
    Stat {
        path: String,
        #[arg(long)]
        json: bool,
    },
    /// Show the kind of file system object at PATH
    Type { path: String },
    /// List a directory
    Ls { path: String },
    /// Show the target of a symbolic link
    Readlink { path: String },
    /// Probe existence and permissions
    Access { path: String },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut loaded = load_config(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        loaded.log.global = LogLevel::parse(level).ok_or_else(|| CliError::LogLevel(level.clone()))?;
    }
    logging::init_with_file(&loaded.log, cli.log_format, cli.log_file.as_deref())?;
    // First and only installation in this process.
    let _ = init_config(loaded);

    let fs = FileSystem::with_backend(LoggedBackend::new(NativeBackend::new()));
    let runner = Runner::new(fs, config(), cli.direct);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Cat {
            path,
            offset,
            length,
        } => {
            runner.cat(&path, offset, length, &mut out)?;
        }
        Command::Write { path, text } => {
            runner.write(&path, text.as_bytes(), &mut out)?;
        }
        Command::Stat { path, json } => runner.stat(&path, json, &mut out)?,
        Command::Type { path } => runner.file_type(&path, &mut out)?,
        Command::Ls { path } => {
            runner.ls(&path, &mut out)?;
        }
        Command::Readlink { path } => runner.readlink(&path, &mut out)?,
        Command::Access { path } => runner.access(&path, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cat_with_window() {
        let cli = Cli::parse_from(["fsio", "--direct", "cat", "/etc/hosts", "--offset", "4", "--length", "8"]);
        assert!(cli.direct);
        assert_eq!(cli.log_format, LogFormat::Compact);
        match cli.command {
            Command::Cat {
                path,
                offset,
                length,
            } => {
                assert_eq!(path, "/etc/hosts");
                assert_eq!(offset, 4);
                assert_eq!(length, Some(8));
            }
            _ => panic!("expected cat"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fsio", "stat", "/tmp", "--json", "--log-level", "debug", "--log-format", "json"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Stat { json: true, .. }));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["fsio", "copy", "a", "b"]).is_err());
    }
}
