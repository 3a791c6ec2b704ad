//! PlatformFileBackend trait definition

use crate::types::{FileEntry, FileInfo};

/// Primitive, platform-specific file system calls.
///
/// Signatures mirror the native syscall layer: failures are signalled through
/// sentinel return values, never through `Result`. The [`FileSystem`] facade
/// is the only intended caller and translates every sentinel into an
/// [`FsError`].
///
/// # Implementations
/// - `NativeBackend`: POSIX syscalls through `libc` (unix only)
/// - `MemoryBackend`: in-process tree, for tests and sandboxes
/// - `LoggedBackend`: decorator tracing every primitive
///
/// [`FileSystem`]: crate::FileSystem
/// [`FsError`]: crate::FsError
pub trait PlatformFileBackend: Send + Sync {
    /// Read up to `count` bytes at the descriptor's cursor into
    /// `array[index..index + count]`, advancing the cursor.
    ///
    /// # Returns
    /// Bytes read (0 at end of file), or a negative value on error
    fn read(&self, fd: i32, array: &mut [u8], index: usize, count: usize) -> i64;

    /// Positioned read of up to `count` bytes from file offset `index` into
    /// the region at `ptr + index`. The descriptor's cursor is not used.
    ///
    /// # Safety
    /// `ptr` must be valid for writes of `size` bytes and not aliased for the
    /// duration of the call.
    ///
    /// # Returns
    /// Bytes read, or a negative value on error (including `index + count > size`)
    unsafe fn pread(&self, fd: i32, ptr: *mut u8, index: usize, count: usize, size: usize)
        -> i64;

    /// Write `array[index..index + count]` at the descriptor's cursor,
    /// advancing the cursor.
    fn write(&self, fd: i32, array: &[u8], index: usize, count: usize) -> i64;

    /// Positioned write of `count` bytes from `ptr + index` to file offset `index`.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of `size` bytes for the duration of the call.
    unsafe fn pwrite(
        &self,
        fd: i32,
        ptr: *const u8,
        index: usize,
        count: usize,
        size: usize,
    ) -> i64;

    /// Move the cursor. `whence` is 0 (start), 1 (current) or 2 (end).
    ///
    /// # Returns
    /// The new absolute position, or a negative value on error
    fn lseek(&self, fd: i32, offset: i64, whence: i32) -> i64;

    /// # Returns
    /// 0 on success
    fn close(&self, fd: i32) -> i32;

    /// Probe `path` against a mask of 0 (exists), 0x01 (x), 0x02 (w), 0x04 (r).
    ///
    /// # Returns
    /// 0 when every requested permission is granted
    fn access(&self, path: &str, amode: i32) -> i32;

    /// # Returns
    /// A `FileType` code, or -1 when the path does not exist
    fn filetype(&self, path: &str) -> i32;

    /// Metadata of `path` itself (links are not followed)
    fn fileinfo(&self, path: &str) -> Option<FileInfo>;

    /// Target of the symbolic link at `path`
    fn readlink(&self, path: &str) -> Option<String>;

    /// Open an existing file. `mode` is 0 (read), 1 (write) or 2 (read-write).
    ///
    /// # Returns
    /// A descriptor, or -1 when the path cannot be opened
    fn open(&self, path: &str, mode: i32) -> i32;

    /// # Returns
    /// A directory handle, or 0 when the directory cannot be opened
    fn opendir(&self, path: &str) -> usize;

    /// Next entry of the stream; `None` once the stream is exhausted
    fn readdir(&self, dir: usize) -> Option<FileEntry>;

    /// # Returns
    /// 0 on success
    fn closedir(&self, dir: usize) -> i32;

    /// OS error code describing the most recent failure on this thread, if
    /// the backend tracks one
    fn last_error(&self) -> Option<i32> {
        None
    }
}
