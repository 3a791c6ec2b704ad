//! CLI error type

use fsio_buffer::BufferError;
use fsio_fs::FsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("cannot read config '{}': {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("offset {0} is beyond the seekable range")]
    OffsetTooLarge(u64),

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("cannot open log file '{}': {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("output failed: {0}")]
    Output(#[from] io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
