//! Native (unix) backend implementation

use crate::types::{FileEntry, FileInfo, FileType};
use crate::PlatformFileBackend;
use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::io;
use std::mem::MaybeUninit;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// POSIX syscalls through `libc`.
///
/// Each primitive is a thin wrapper; failures come back as the sentinel
/// the syscall itself returns, and `errno` stays available through
/// [`PlatformFileBackend::last_error`]. Paths containing an interior NUL
/// cannot be expressed to the kernel and fail with the sentinel.
///
/// Directory streams are tracked per backend: `readdir` and `closedir` only
/// touch handles this backend opened and has not closed yet, and calls on
/// the same stream are serialized.
///
/// # Example
/// ```
/// use fsio_fs::{NativeBackend, PlatformFileBackend};
///
/// let backend = NativeBackend::new();
/// assert_ne!(backend.access("/definitely/not/here", 0), 0);
/// ```
#[derive(Debug, Default)]
pub struct NativeBackend {
    dirs: Mutex<HashSet<usize>>,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Drop for NativeBackend {
    fn drop(&mut self) {
        let dirs = match self.dirs.get_mut() {
            Ok(dirs) => dirs,
            Err(poisoned) => poisoned.into_inner(),
        };
        for dir in dirs.drain() {
            // SAFETY: every tracked handle is a live stream from opendir.
            unsafe { libc::closedir(dir as *mut libc::DIR) };
        }
    }
}

fn c_path(path: &str) -> Option<CString> {
    CString::new(path).ok()
}

fn lstat(path: &str) -> Option<libc::stat> {
    let path = c_path(path)?;
    let mut st = MaybeUninit::<libc::stat>::uninit();
    // SAFETY: path is NUL-terminated; st is written in full on success.
    let rc = unsafe { libc::lstat(path.as_ptr(), st.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    // SAFETY: lstat returned 0.
    Some(unsafe { st.assume_init() })
}

/// Raw link target, growing the buffer until the target fits with room to spare
fn read_link(path: &CStr, initial: usize) -> Option<Vec<u8>> {
    let mut buf = vec![0u8; initial.max(1)];
    loop {
        // SAFETY: path is NUL-terminated; buf is writable for buf.len() bytes.
        let n = unsafe { libc::readlink(path.as_ptr(), buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return None;
        }
        let n = n as usize;
        if n < buf.len() {
            buf.truncate(n);
            return Some(buf);
        }
        let grown = buf.len().checked_mul(2)?;
        buf.resize(grown, 0);
    }
}

fn mode_type(mode: libc::mode_t) -> FileType {
    match mode & libc::S_IFMT {
        m if m == libc::S_IFREG => FileType::Regular,
        m if m == libc::S_IFDIR => FileType::Directory,
        m if m == libc::S_IFLNK => FileType::Symlink,
        m if m == libc::S_IFCHR => FileType::CharDevice,
        m if m == libc::S_IFBLK => FileType::BlockDevice,
        m if m == libc::S_IFIFO => FileType::Fifo,
        m if m == libc::S_IFSOCK => FileType::Socket,
        _ => FileType::Unknown,
    }
}

fn dirent_type(d_type: u8) -> FileType {
    match d_type {
        libc::DT_REG => FileType::Regular,
        libc::DT_DIR => FileType::Directory,
        libc::DT_LNK => FileType::Symlink,
        libc::DT_CHR => FileType::CharDevice,
        libc::DT_BLK => FileType::BlockDevice,
        libc::DT_FIFO => FileType::Fifo,
        libc::DT_SOCK => FileType::Socket,
        _ => FileType::Unknown,
    }
}

fn timestamp(secs: i64, nanos: i64) -> SystemTime {
    let nanos = Duration::from_nanos(nanos.clamp(0, 999_999_999) as u64);
    if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64) + nanos
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + nanos
    }
}

fn access_mask(amode: i32) -> libc::c_int {
    let mut mask = libc::F_OK;
    if amode & 0x01 != 0 {
        mask |= libc::X_OK;
    }
    if amode & 0x02 != 0 {
        mask |= libc::W_OK;
    }
    if amode & 0x04 != 0 {
        mask |= libc::R_OK;
    }
    mask
}

fn span_fits(index: usize, count: usize, size: usize) -> bool {
    index.checked_add(count).is_some_and(|end| end <= size)
}

impl PlatformFileBackend for NativeBackend {
    fn read(&self, fd: i32, array: &mut [u8], index: usize, count: usize) -> i64 {
        if !span_fits(index, count, array.len()) {
            return -1;
        }
        let span = &mut array[index..index + count];
        // SAFETY: span is a valid, exclusively borrowed region of span.len() bytes.
        unsafe { libc::read(fd, span.as_mut_ptr().cast(), span.len()) as i64 }
    }

    unsafe fn pread(
        &self,
        fd: i32,
        ptr: *mut u8,
        index: usize,
        count: usize,
        size: usize,
    ) -> i64 {
        if !span_fits(index, count, size) {
            return -1;
        }
        libc::pread(fd, ptr.add(index).cast(), count, index as libc::off_t) as i64
    }

    fn write(&self, fd: i32, array: &[u8], index: usize, count: usize) -> i64 {
        if !span_fits(index, count, array.len()) {
            return -1;
        }
        let span = &array[index..index + count];
        // SAFETY: span is a valid region of span.len() bytes.
        unsafe { libc::write(fd, span.as_ptr().cast(), span.len()) as i64 }
    }

    unsafe fn pwrite(
        &self,
        fd: i32,
        ptr: *const u8,
        index: usize,
        count: usize,
        size: usize,
    ) -> i64 {
        if !span_fits(index, count, size) {
            return -1;
        }
        libc::pwrite(fd, ptr.add(index).cast(), count, index as libc::off_t) as i64
    }

    fn lseek(&self, fd: i32, offset: i64, whence: i32) -> i64 {
        let whence = match whence {
            0 => libc::SEEK_SET,
            1 => libc::SEEK_CUR,
            2 => libc::SEEK_END,
            _ => return -1,
        };
        // SAFETY: plain syscall on an integer descriptor.
        unsafe { libc::lseek(fd, offset as libc::off_t, whence) as i64 }
    }

    fn close(&self, fd: i32) -> i32 {
        // SAFETY: plain syscall on an integer descriptor.
        unsafe { libc::close(fd) }
    }

    fn access(&self, path: &str, amode: i32) -> i32 {
        let Some(path) = c_path(path) else {
            return -1;
        };
        // SAFETY: path is NUL-terminated.
        unsafe { libc::access(path.as_ptr(), access_mask(amode)) }
    }

    fn filetype(&self, path: &str) -> i32 {
        match lstat(path) {
            Some(st) => mode_type(st.st_mode).code(),
            None => -1,
        }
    }

    fn fileinfo(&self, path: &str) -> Option<FileInfo> {
        let st = lstat(path)?;
        Some(FileInfo {
            file_type: mode_type(st.st_mode),
            size: st.st_size as u64,
            permissions: (st.st_mode & 0o7777) as u32,
            owner: st.st_uid as u32,
            group: st.st_gid as u32,
            accessed: timestamp(st.st_atime as i64, st.st_atime_nsec as i64),
            modified: timestamp(st.st_mtime as i64, st.st_mtime_nsec as i64),
            changed: timestamp(st.st_ctime as i64, st.st_ctime_nsec as i64),
        })
    }

    /// Targets that are not UTF-8 are decoded lossily.
    fn readlink(&self, path: &str) -> Option<String> {
        let path = c_path(path)?;
        let target = read_link(&path, libc::PATH_MAX as usize)?;
        Some(String::from_utf8_lossy(&target).into_owned())
    }

    fn open(&self, path: &str, mode: i32) -> i32 {
        let Some(path) = c_path(path) else {
            return -1;
        };
        let flags = match mode {
            0 => libc::O_RDONLY,
            1 => libc::O_WRONLY,
            _ => libc::O_RDWR,
        };
        // SAFETY: path is NUL-terminated; no O_CREAT so no mode argument.
        unsafe { libc::open(path.as_ptr(), flags | libc::O_CLOEXEC) }
    }

    fn opendir(&self, path: &str) -> usize {
        let Some(path) = c_path(path) else {
            return 0;
        };
        let Ok(mut dirs) = self.dirs.lock() else {
            return 0;
        };
        // SAFETY: path is NUL-terminated.
        let dir = unsafe { libc::opendir(path.as_ptr()) } as usize;
        if dir != 0 {
            dirs.insert(dir);
        }
        dir
    }

    fn readdir(&self, dir: usize) -> Option<FileEntry> {
        let dirs = self.dirs.lock().ok()?;
        if !dirs.contains(&dir) {
            return None;
        }
        loop {
            // SAFETY: dir is a live stream from opendir; the lock is held.
            let entry = unsafe { libc::readdir(dir as *mut libc::DIR) };
            if entry.is_null() {
                return None;
            }
            // SAFETY: entry is non-null and valid until the next readdir on dir.
            let (name, d_type) = unsafe {
                let name = CStr::from_ptr((*entry).d_name.as_ptr());
                (name.to_string_lossy().into_owned(), (*entry).d_type)
            };
            if name == "." || name == ".." {
                continue;
            }
            return Some(FileEntry {
                name,
                file_type: dirent_type(d_type),
            });
        }
    }

    fn closedir(&self, dir: usize) -> i32 {
        let Ok(mut dirs) = self.dirs.lock() else {
            return -1;
        };
        if !dirs.remove(&dir) {
            return -1;
        }
        // SAFETY: dir was a live stream from opendir and is now forgotten.
        unsafe { libc::closedir(dir as *mut libc::DIR) }
    }

    fn last_error(&self) -> Option<i32> {
        io::Error::last_os_error().raw_os_error()
    }
}
