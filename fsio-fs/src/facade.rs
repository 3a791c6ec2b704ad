//! FileSystem facade

use crate::error::{FsError, FsResult};
use crate::types::{
    AccessFlag, AccessMode, DirectoryHandle, FileDescriptor, FileEntry, FileInfo, FileType,
    SeekDirective,
};
use crate::PlatformFileBackend;
use fsio_buffer::{BufferError, BufferKind, BufferKindMut, ByteBuffer, StorageKind};
use std::fmt;
use std::io;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::{debug, warn};

const TARGET: &str = "fsio::facade";

/// Typed entry point for file operations.
///
/// Every call goes straight to one backend primitive; the facade keeps no
/// state of its own. Sentinel results are translated here, so callers only
/// ever see `FsResult` values, `bool` probes or `Option` end markers.
///
/// Buffer I/O picks the primitive from the buffer's storage variant:
/// heap buffers use the cursor-based `read`/`write`, direct buffers use
/// positioned `pread`/`pwrite` at file offset `index`.
///
/// # Example
/// ```
/// use fsio_buffer::{ByteBuffer, HeapBuffer};
/// use fsio_fs::{AccessMode, FileSystem, MemoryBackend};
///
/// let fs = FileSystem::with_backend(MemoryBackend::with_files([("/a.txt", b"hi".to_vec())]));
/// let fd = fs.open_file("/a.txt", AccessMode::ReadOnly).unwrap();
/// let mut buf = HeapBuffer::new(2);
/// assert_eq!(fs.read_file(fd, &mut buf, 0, 2).unwrap(), 2);
/// assert_eq!(buf.as_slice(), b"hi");
/// assert!(fs.close_file(fd));
/// ```
#[derive(Clone)]
pub struct FileSystem {
    backend: Arc<dyn PlatformFileBackend>,
}

impl fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystem").finish_non_exhaustive()
    }
}

impl FileSystem {
    /// Facade over a shared backend
    pub fn new(backend: Arc<dyn PlatformFileBackend>) -> Self {
        Self { backend }
    }

    pub fn with_backend<B: PlatformFileBackend + 'static>(backend: B) -> Self {
        Self::new(Arc::new(backend))
    }

    /// Facade over the platform's native backend.
    #[cfg(all(unix, feature = "native"))]
    pub fn native() -> Self {
        Self::with_backend(crate::native::NativeBackend::new())
    }

    pub fn backend(&self) -> &Arc<dyn PlatformFileBackend> {
        &self.backend
    }

    /// Open an existing file.
    ///
    /// # Errors
    /// `FileNotFound` when the backend refuses the path. Files are never created.
    pub fn open_file(&self, path: &str, mode: AccessMode) -> FsResult<FileDescriptor> {
        let raw = self.backend.open(path, mode.raw());
        if raw == -1 {
            warn!(target: TARGET, path, ?mode, "open failed");
            return Err(FsError::not_found(path));
        }
        debug!(target: TARGET, path, ?mode, fd = raw, "opened");
        Ok(FileDescriptor::from_raw(raw))
    }

    /// [`FileSystem::open_file`] with a raw mode value; unknown values open
    /// read-write.
    pub fn open_file_raw(&self, path: &str, mode: i32) -> FsResult<FileDescriptor> {
        self.open_file(path, AccessMode::from_raw(mode))
    }

    /// Read up to `count` bytes into `buffer[index..index + count]`.
    ///
    /// # Returns
    /// Bytes transferred; 0 at end of file
    ///
    /// # Errors
    /// - `UnsupportedBufferVariant` for buffers that are neither heap nor direct
    /// - `IndexOutOfRange` when the span exceeds the buffer's limit
    /// - `Io` when the primitive fails
    pub fn read_file(
        &self,
        fd: FileDescriptor,
        buffer: &mut dyn ByteBuffer,
        index: usize,
        count: usize,
    ) -> FsResult<u64> {
        let result = match buffer.kind_mut() {
            BufferKindMut::Heap(heap) => {
                check_span(index, count, heap.limit())?;
                self.backend.read(fd.raw(), heap.array_mut(), index, count)
            }
            BufferKindMut::Direct(direct) => {
                let limit = direct.limit();
                check_span(index, count, limit)?;
                // SAFETY: the region is owned by `direct` for the whole call and
                // `index + count <= limit <= capacity` of that same buffer.
                unsafe {
                    self.backend
                        .pread(fd.raw(), direct.as_mut_ptr(), index, count, limit)
                }
            }
            BufferKindMut::Foreign => return Err(self.unsupported("read_file")),
        };
        self.transferred("read", fd, result)
    }

    /// Write `buffer[index..index + count]`; mirrors [`FileSystem::read_file`].
    pub fn write_file(
        &self,
        fd: FileDescriptor,
        buffer: &dyn ByteBuffer,
        index: usize,
        count: usize,
    ) -> FsResult<u64> {
        let result = match buffer.kind() {
            BufferKind::Heap(heap) => {
                check_span(index, count, heap.limit())?;
                self.backend.write(fd.raw(), heap.array(), index, count)
            }
            BufferKind::Direct(direct) => {
                let limit = direct.limit();
                check_span(index, count, limit)?;
                // SAFETY: the region is borrowed from `direct` for the whole call
                // and `index + count <= limit <= capacity` of that same buffer.
                unsafe {
                    self.backend
                        .pwrite(fd.raw(), direct.as_ptr(), index, count, limit)
                }
            }
            BufferKind::Foreign => return Err(self.unsupported("write_file")),
        };
        self.transferred("write", fd, result)
    }

    /// Move the descriptor's cursor.
    ///
    /// # Returns
    /// The new absolute position
    pub fn seek_file(
        &self,
        fd: FileDescriptor,
        position: i64,
        whence: SeekDirective,
    ) -> FsResult<u64> {
        let result = self.backend.lseek(fd.raw(), position, whence.whence());
        self.transferred("lseek", fd, result)
    }

    /// Current cursor position
    pub fn tell_file(&self, fd: FileDescriptor) -> FsResult<u64> {
        self.seek_file(fd, 0, SeekDirective::Cur)
    }

    /// Release the descriptor. The descriptor is unusable afterwards,
    /// whatever the result.
    pub fn close_file(&self, fd: FileDescriptor) -> bool {
        let closed = self.backend.close(fd.raw()) == 0;
        debug!(target: TARGET, %fd, closed, "close");
        closed
    }

    pub fn check_readable(&self, path: &str) -> bool {
        self.probe(path, AccessFlag::Read)
    }

    pub fn check_writable(&self, path: &str) -> bool {
        self.probe(path, AccessFlag::Write)
    }

    pub fn check_executable(&self, path: &str) -> bool {
        self.probe(path, AccessFlag::Execute)
    }

    pub fn check_exists(&self, path: &str) -> bool {
        self.probe(path, AccessFlag::Exists)
    }

    /// Kind of object at `path`, without following a final symlink
    pub fn get_file_type(&self, path: &str) -> FsResult<FileType> {
        match self.backend.filetype(path) {
            -1 => {
                warn!(target: TARGET, path, "filetype failed");
                Err(FsError::not_found(path))
            }
            code => Ok(FileType::from_code(code)),
        }
    }

    pub fn get_file_info(&self, path: &str) -> FsResult<FileInfo> {
        self.backend.fileinfo(path).ok_or_else(|| {
            warn!(target: TARGET, path, "fileinfo failed");
            FsError::not_found(path)
        })
    }

    /// Target of the symbolic link at `path`.
    ///
    /// # Errors
    /// `NotALink` for anything the backend cannot read a link from,
    /// including missing paths.
    pub fn get_link_target(&self, path: &str) -> FsResult<String> {
        self.backend.readlink(path).ok_or_else(|| {
            warn!(target: TARGET, path, "readlink failed");
            FsError::NotALink {
                path: path.to_string(),
            }
        })
    }

    pub fn open_dir(&self, path: &str) -> FsResult<DirectoryHandle> {
        match self.backend.opendir(path) {
            0 => {
                warn!(target: TARGET, path, "opendir failed");
                Err(FsError::not_found(path))
            }
            raw => {
                debug!(target: TARGET, path, handle = raw, "opened directory");
                Ok(DirectoryHandle::from_raw(raw))
            }
        }
    }

    /// Next entry, or `None` once the stream is exhausted
    pub fn read_dir(&self, handle: DirectoryHandle) -> Option<FileEntry> {
        self.backend.readdir(handle.raw())
    }

    /// Iterate the remaining entries of `handle`. The handle still has to be
    /// closed with [`FileSystem::close_dir`].
    pub fn entries(&self, handle: DirectoryHandle) -> DirEntries<'_> {
        DirEntries {
            fs: self,
            handle,
            done: false,
        }
    }

    pub fn close_dir(&self, handle: DirectoryHandle) -> bool {
        let closed = self.backend.closedir(handle.raw()) == 0;
        debug!(target: TARGET, handle = handle.raw(), closed, "close directory");
        closed
    }

    fn probe(&self, path: &str, flag: AccessFlag) -> bool {
        self.backend.access(path, flag.bits()) == 0
    }

    fn unsupported(&self, op: &'static str) -> FsError {
        warn!(target: TARGET, op, "buffer is neither heap nor direct");
        FsError::UnsupportedBufferVariant
    }

    fn transferred(&self, op: &'static str, fd: FileDescriptor, result: i64) -> FsResult<u64> {
        if result < 0 {
            let source = match self.backend.last_error() {
                Some(code) => io::Error::from_raw_os_error(code),
                None => io::Error::new(io::ErrorKind::Other, format!("{} returned {}", op, result)),
            };
            warn!(target: TARGET, op, %fd, error = %source, "primitive failed");
            return Err(FsError::Io { op, source });
        }
        Ok(result as u64)
    }
}

fn check_span(index: usize, count: usize, limit: usize) -> FsResult<()> {
    match index.checked_add(count) {
        Some(end) if end <= limit => Ok(()),
        end => Err(BufferError::RangeOutOfBounds {
            start: index,
            end: end.unwrap_or(usize::MAX),
            limit,
        }
        .into()),
    }
}

/// Iterator over the entries of an open directory stream.
///
/// Ends at the first `None` from the backend and stays ended.
pub struct DirEntries<'a> {
    fs: &'a FileSystem,
    handle: DirectoryHandle,
    done: bool,
}

impl Iterator for DirEntries<'_> {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        if self.done {
            return None;
        }
        let entry = self.fs.read_dir(self.handle);
        self.done = entry.is_none();
        entry
    }
}

impl FusedIterator for DirEntries<'_> {}
