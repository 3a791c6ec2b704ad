//! Handles, records and the fixed numeric enumerations shared with backends

use serde::Serialize;
use std::fmt;
use std::time::SystemTime;

/// Platform-assigned handle of an open file.
///
/// Valid from a successful `open_file` until `close_file`. The facade does
/// not track validity; a stale descriptor fails in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileDescriptor(i32);

impl FileDescriptor {
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd:{}", self.0)
    }
}

/// Platform-sized handle of an open directory stream. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectoryHandle(usize);

impl DirectoryHandle {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

/// Reference point for a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekDirective {
    /// From the start of the file
    Set,
    /// From the current position
    Cur,
    /// From the end of the file
    End,
}

impl SeekDirective {
    /// Backend `whence` value
    pub fn whence(self) -> i32 {
        match self {
            SeekDirective::Set => 0,
            SeekDirective::Cur => 1,
            SeekDirective::End => 2,
        }
    }
}

/// Access probe, as a bit for the backend's `access` mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessFlag {
    /// F_OK
    Exists,
    /// X_OK
    Execute,
    /// W_OK
    Write,
    /// R_OK
    Read,
}

impl AccessFlag {
    pub fn bits(self) -> i32 {
        match self {
            AccessFlag::Exists => 0,
            AccessFlag::Execute => 0x01,
            AccessFlag::Write => 0x02,
            AccessFlag::Read => 0x04,
        }
    }
}

/// Mode a file is opened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    /// Backend mode value
    pub fn raw(self) -> i32 {
        match self {
            AccessMode::ReadOnly => 0,
            AccessMode::WriteOnly => 1,
            AccessMode::ReadWrite => 2,
        }
    }

    /// Inverse of [`AccessMode::raw`]; any unknown value means read-write.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => AccessMode::ReadOnly,
            1 => AccessMode::WriteOnly,
            _ => AccessMode::ReadWrite,
        }
    }

    pub fn readable(self) -> bool {
        !matches!(self, AccessMode::WriteOnly)
    }

    pub fn writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }
}

/// Kind of file system object, with a stable numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Unknown,
    Regular,
    Directory,
    Symlink,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
}

impl FileType {
    pub fn code(self) -> i32 {
        match self {
            FileType::Unknown => 0,
            FileType::Regular => 1,
            FileType::Directory => 2,
            FileType::Symlink => 3,
            FileType::CharDevice => 4,
            FileType::BlockDevice => 5,
            FileType::Fifo => 6,
            FileType::Socket => 7,
        }
    }

    /// Unknown codes map to `Unknown`
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => FileType::Regular,
            2 => FileType::Directory,
            3 => FileType::Symlink,
            4 => FileType::CharDevice,
            5 => FileType::BlockDevice,
            6 => FileType::Fifo,
            7 => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Unknown => "unknown",
            FileType::Regular => "regular",
            FileType::Directory => "directory",
            FileType::Symlink => "symlink",
            FileType::CharDevice => "char_device",
            FileType::BlockDevice => "block_device",
            FileType::Fifo => "fifo",
            FileType::Socket => "socket",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a file's metadata, taken once per `get_file_info` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_type: FileType,
    pub size: u64,
    /// Permission bits (setuid/setgid/sticky + rwx triplets)
    pub permissions: u32,
    pub owner: u32,
    pub group: u32,
    pub accessed: SystemTime,
    pub modified: SystemTime,
    /// Last status change
    pub changed: SystemTime,
}

/// One directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub file_type: FileType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_whence_values() {
        assert_eq!(SeekDirective::Set.whence(), 0);
        assert_eq!(SeekDirective::Cur.whence(), 1);
        assert_eq!(SeekDirective::End.whence(), 2);
    }

    #[test]
    fn test_access_flag_bits() {
        assert_eq!(AccessFlag::Exists.bits(), 0);
        assert_eq!(AccessFlag::Execute.bits(), 0x01);
        assert_eq!(AccessFlag::Write.bits(), 0x02);
        assert_eq!(AccessFlag::Read.bits(), 0x04);
    }

    #[test]
    fn test_access_mode_from_raw_defaults_to_read_write() {
        assert_eq!(AccessMode::from_raw(0), AccessMode::ReadOnly);
        assert_eq!(AccessMode::from_raw(1), AccessMode::WriteOnly);
        assert_eq!(AccessMode::from_raw(2), AccessMode::ReadWrite);
        assert_eq!(AccessMode::from_raw(7), AccessMode::ReadWrite);
        assert_eq!(AccessMode::from_raw(-1), AccessMode::ReadWrite);
    }

    #[test]
    fn test_access_mode_capabilities() {
        assert!(AccessMode::ReadOnly.readable() && !AccessMode::ReadOnly.writable());
        assert!(!AccessMode::WriteOnly.readable() && AccessMode::WriteOnly.writable());
        assert!(AccessMode::ReadWrite.readable() && AccessMode::ReadWrite.writable());
    }

    #[test]
    fn test_file_type_codes_are_stable() {
        for code in 0..8 {
            assert_eq!(FileType::from_code(code).code(), code);
        }
        assert_eq!(FileType::from_code(42), FileType::Unknown);
        assert_eq!(FileType::from_code(-1), FileType::Unknown);
    }

    #[test]
    fn test_file_type_display_matches_serde() {
        for code in 0..8 {
            let file_type = FileType::from_code(code);
            let json = serde_json::to_string(&file_type).unwrap();
            assert_eq!(json, format!("\"{}\"", file_type));
        }
    }

    #[test]
    fn test_file_entry_serializes() {
        let entry = FileEntry {
            name: "a.txt".to_string(),
            file_type: FileType::Regular,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"a.txt","file_type":"regular"}"#);
    }

    #[test]
    fn test_descriptor_display() {
        assert_eq!(FileDescriptor::from_raw(5).to_string(), "fd:5");
        assert_eq!(DirectoryHandle::from_raw(9).raw(), 9);
    }
}
