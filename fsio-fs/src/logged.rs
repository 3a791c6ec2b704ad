//! Tracing decorator for backend primitives

use crate::types::{FileEntry, FileInfo};
use crate::PlatformFileBackend;
use std::cell::Cell;
use tracing::trace;

const TARGET: &str = "fsio::backend";

thread_local! {
    // Error code of the most recent failed primitive, taken before tracing
    static LAST_ERROR: Cell<Option<i32>> = const { Cell::new(None) };
}

/// Backend wrapper that emits a `trace` event for every primitive call
/// and its raw result, then forwards to the inner backend unchanged.
///
/// The inner backend's error code is captured before the event is emitted,
/// so a subscriber that performs I/O of its own cannot replace it.
#[derive(Debug, Clone, Default)]
pub struct LoggedBackend<B> {
    inner: B,
}

impl<B: PlatformFileBackend> LoggedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    fn settle(&self, failed: bool) {
        let code = if failed { self.inner.last_error() } else { None };
        LAST_ERROR.with(|last| last.set(code));
    }
}

impl<B: PlatformFileBackend> PlatformFileBackend for LoggedBackend<B> {
    fn read(&self, fd: i32, array: &mut [u8], index: usize, count: usize) -> i64 {
        let result = self.inner.read(fd, array, index, count);
        self.settle(result < 0);
        trace!(target: TARGET, fd, index, count, result, "read");
        result
    }

    unsafe fn pread(
        &self,
        fd: i32,
        ptr: *mut u8,
        index: usize,
        count: usize,
        size: usize,
    ) -> i64 {
        // SAFETY: forwarded verbatim; the caller upholds the contract.
        let result = unsafe { self.inner.pread(fd, ptr, index, count, size) };
        self.settle(result < 0);
        trace!(target: TARGET, fd, index, count, size, result, "pread");
        result
    }

    fn write(&self, fd: i32, array: &[u8], index: usize, count: usize) -> i64 {
        let result = self.inner.write(fd, array, index, count);
        self.settle(result < 0);
        trace!(target: TARGET, fd, index, count, result, "write");
        result
    }

    unsafe fn pwrite(
        &self,
        fd: i32,
        ptr: *const u8,
        index: usize,
        count: usize,
        size: usize,
    ) -> i64 {
        // SAFETY: forwarded verbatim; the caller upholds the contract.
        let result = unsafe { self.inner.pwrite(fd, ptr, index, count, size) };
        self.settle(result < 0);
        trace!(target: TARGET, fd, index, count, size, result, "pwrite");
        result
    }

    fn lseek(&self, fd: i32, offset: i64, whence: i32) -> i64 {
        let result = self.inner.lseek(fd, offset, whence);
        self.settle(result < 0);
        trace!(target: TARGET, fd, offset, whence, result, "lseek");
        result
    }

    fn close(&self, fd: i32) -> i32 {
        let result = self.inner.close(fd);
        self.settle(result != 0);
        trace!(target: TARGET, fd, result, "close");
        result
    }

    fn access(&self, path: &str, amode: i32) -> i32 {
        let result = self.inner.access(path, amode);
        self.settle(result != 0);
        trace!(target: TARGET, path, amode, result, "access");
        result
    }

    fn filetype(&self, path: &str) -> i32 {
        let result = self.inner.filetype(path);
        self.settle(result < 0);
        trace!(target: TARGET, path, result, "filetype");
        result
    }

    fn fileinfo(&self, path: &str) -> Option<FileInfo> {
        let result = self.inner.fileinfo(path);
        self.settle(result.is_none());
        trace!(target: TARGET, path, found = result.is_some(), "fileinfo");
        result
    }

    fn readlink(&self, path: &str) -> Option<String> {
        let result = self.inner.readlink(path);
        self.settle(result.is_none());
        trace!(target: TARGET, path, link = ?result, "readlink");
        result
    }

    fn open(&self, path: &str, mode: i32) -> i32 {
        let result = self.inner.open(path, mode);
        self.settle(result < 0);
        trace!(target: TARGET, path, mode, result, "open");
        result
    }

    fn opendir(&self, path: &str) -> usize {
        let result = self.inner.opendir(path);
        self.settle(result == 0);
        trace!(target: TARGET, path, result, "opendir");
        result
    }

    fn readdir(&self, dir: usize) -> Option<FileEntry> {
        let result = self.inner.readdir(dir);
        self.settle(result.is_none());
        trace!(target: TARGET, dir, entry = ?result.as_ref().map(|e| &e.name), "readdir");
        result
    }

    fn closedir(&self, dir: usize) -> i32 {
        let result = self.inner.closedir(dir);
        self.settle(result != 0);
        trace!(target: TARGET, dir, result, "closedir");
        result
    }

    fn last_error(&self) -> Option<i32> {
        LAST_ERROR.with(Cell::get)
    }
}
