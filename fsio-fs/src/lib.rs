//! fsio file system facade
//!
//! Typed file operations over a table of platform primitives that signal
//! failure through sentinels (`-1`, `0`, `None`).
//!
//! # Backends
//! - [`NativeBackend`] (unix, `native` feature): POSIX calls through `libc`
//! - [`MemoryBackend`]: in-process tree with a primitive call log
//! - [`LoggedBackend`]: decorator tracing every primitive
//!
//! # Usage
//! ```rust
//! use fsio_fs::{FileSystem, FileType, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! backend.add_dir("/etc");
//! let fs = FileSystem::with_backend(backend);
//! assert_eq!(fs.get_file_type("/etc").unwrap(), FileType::Directory);
//! assert!(!fs.check_exists("/etc/passwd"));
//! ```

mod error;
mod facade;
mod logged;
mod memory;
#[cfg(all(unix, feature = "native"))]
mod native;
mod r#trait;
mod types;

pub use error::{FsError, FsResult};
pub use facade::{DirEntries, FileSystem};
pub use logged::LoggedBackend;
pub use memory::{MemoryBackend, Primitive};
#[cfg(all(unix, feature = "native"))]
pub use native::NativeBackend;
pub use r#trait::PlatformFileBackend;
pub use types::{
    AccessFlag, AccessMode, DirectoryHandle, FileDescriptor, FileEntry, FileInfo, FileType,
    SeekDirective,
};
