//! File system error types

use fsio_buffer::BufferError;
use std::io;
use thiserror::Error;

/// Result type for facade operations
pub type FsResult<T> = Result<T, FsError>;

/// Error type for facade operations.
///
/// Every sentinel a backend primitive can return is mapped to one of these
/// before it reaches the caller.
#[derive(Error, Debug)]
pub enum FsError {
    /// Path, descriptor or directory does not resolve
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// `readlink` produced nothing for this path
    #[error("not a symbolic link: {path}")]
    NotALink { path: String },

    /// Buffer is neither a heap nor a direct buffer
    #[error("unsupported buffer variant")]
    UnsupportedBufferVariant,

    /// Requested span does not fit the buffer
    #[error("buffer index out of range: {0}")]
    IndexOutOfRange(#[from] BufferError),

    /// Any other primitive failure
    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub(crate) fn not_found(path: &str) -> Self {
        FsError::FileNotFound {
            path: path.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::FileNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FsError::not_found("/x").to_string(),
            "file not found: /x"
        );
        assert_eq!(
            FsError::NotALink {
                path: "/y".to_string()
            }
            .to_string(),
            "not a symbolic link: /y"
        );
        assert_eq!(
            FsError::UnsupportedBufferVariant.to_string(),
            "unsupported buffer variant"
        );
    }

    #[test]
    fn test_from_buffer_error() {
        let err: FsError = BufferError::IndexOutOfRange { index: 3, len: 2 }.into();
        assert!(matches!(err, FsError::IndexOutOfRange(_)));
        assert!(err.to_string().contains("index 3 out of range"));
    }

    #[test]
    fn test_io_error_source() {
        let err = FsError::Io {
            op: "read",
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert_eq!(err.to_string(), "read failed: boom");
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
    }
}
