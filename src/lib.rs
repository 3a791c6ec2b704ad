//! fsio - platform-neutral low-level file I/O
//!
//! Byte buffers with heap or direct storage, and a file system facade that
//! turns sentinel-returning platform primitives into typed results.
//!
//! # Architecture
//!
//! ```text
//! fsio-config/  - plain configuration data (serde)
//! fsio-buffer/  - ByteBuffer, HeapBuffer, DirectBuffer, ByteOrder
//! fsio-fs/      - FileSystem facade, PlatformFileBackend and its backends
//! fsio-cli/     - the `fsio` command line tool
//! ```
//!
//! # Quick Start
//!
//! ```
//! use fsio::{AccessMode, ByteBuffer, FileSystem, HeapBuffer, MemoryBackend};
//!
//! let backend = MemoryBackend::with_files([("/notes.txt", b"direct or heap".to_vec())]);
//! let fs = FileSystem::with_backend(backend);
//!
//! let fd = fs.open_file("/notes.txt", AccessMode::ReadOnly).unwrap();
//! let mut buf = HeapBuffer::new(6);
//! let n = fs.read_file(fd, &mut buf, 0, 6).unwrap();
//! assert_eq!(&buf.as_slice()[..n as usize], b"direct");
//! assert!(fs.close_file(fd));
//! ```

pub use fsio_buffer as buffer;
pub use fsio_config as config;
pub use fsio_fs as fs;

pub use fsio_buffer::{
    BufferError, ByteBuffer, ByteOrder, DirectBuffer, HeapBuffer, StorageKind,
};
pub use fsio_config::Config;
#[cfg(unix)]
pub use fsio_fs::NativeBackend;
pub use fsio_fs::{
    AccessFlag, AccessMode, DirectoryHandle, FileDescriptor, FileEntry, FileInfo, FileSystem,
    FileType, FsError, FsResult, LoggedBackend, MemoryBackend, PlatformFileBackend, SeekDirective,
};
