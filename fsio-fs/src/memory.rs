//! In-memory backend implementation

use crate::types::{AccessMode, FileEntry, FileInfo, FileType};
use crate::PlatformFileBackend;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::SystemTime;

/// Symlink hops followed before giving up
const MAX_LINK_DEPTH: usize = 8;

/// Primitive names, as recorded in the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Read,
    Pread,
    Write,
    Pwrite,
    Lseek,
    Close,
    Access,
    FileType,
    FileInfo,
    ReadLink,
    Open,
    OpenDir,
    ReadDir,
    CloseDir,
}

#[derive(Debug, Clone)]
enum NodeKind {
    File(Vec<u8>),
    Dir,
    Symlink(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    permissions: u32,
    modified: SystemTime,
}

impl Node {
    fn new(kind: NodeKind, permissions: u32) -> Self {
        Self {
            kind,
            permissions,
            modified: SystemTime::now(),
        }
    }

    fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::File(_) => FileType::Regular,
            NodeKind::Dir => FileType::Directory,
            NodeKind::Symlink(_) => FileType::Symlink,
        }
    }

    fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File(data) => data.len() as u64,
            NodeKind::Dir => 0,
            NodeKind::Symlink(target) => target.len() as u64,
        }
    }
}

#[derive(Debug)]
struct OpenFile {
    path: String,
    mode: AccessMode,
    cursor: u64,
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    files: BTreeMap<i32, OpenFile>,
    dirs: BTreeMap<usize, VecDeque<FileEntry>>,
    next_fd: i32,
    next_dir: usize,
    calls: Vec<Primitive>,
}

impl State {
    /// Follow symlinks until a non-link node (or nothing) is reached
    fn resolve(&self, path: &str) -> Option<(String, &Node)> {
        let mut current = path.to_string();
        for _ in 0..=MAX_LINK_DEPTH {
            let node = self.nodes.get(&current)?;
            match &node.kind {
                NodeKind::Symlink(target) => current = join_link(&current, target),
                _ => return Some((current, node)),
            }
        }
        None
    }

    fn file_mut(&mut self, fd: i32) -> Option<(&mut OpenFile, &mut Vec<u8>)> {
        let open = self.files.get_mut(&fd)?;
        match self.nodes.get_mut(&open.path) {
            Some(Node {
                kind: NodeKind::File(data),
                modified,
                ..
            }) => {
                if open.mode.writable() {
                    *modified = SystemTime::now();
                }
                Some((open, data))
            }
            _ => None,
        }
    }
}

/// An in-memory backend.
///
/// Files, directories and symbolic links live in a `BTreeMap` keyed by
/// normalized absolute path. Descriptors carry their own cursor; directory
/// streams snapshot their entries at `opendir`. Every primitive call is
/// appended to a log so tests can assert which primitive served a request.
///
/// Clones share the same tree.
///
/// # Example
/// ```
/// use fsio_fs::{MemoryBackend, PlatformFileBackend};
///
/// let backend = MemoryBackend::with_files([("/a.txt", b"hello".to_vec())]);
/// let fd = backend.open("/a.txt", 0);
/// let mut out = [0u8; 5];
/// assert_eq!(backend.read(fd, &mut out, 0, 5), 5);
/// assert_eq!(&out, b"hello");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Arc<RwLock<State>>,
}

impl MemoryBackend {
    /// Create a backend holding only the root directory.
    pub fn new() -> Self {
        let mut state = State {
            next_fd: 3,
            next_dir: 1,
            ..Default::default()
        };
        state
            .nodes
            .insert("/".to_string(), Node::new(NodeKind::Dir, 0o755));
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Create a backend pre-populated with files.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let backend = Self::new();
        for (path, content) in files {
            backend.add_file(path.as_ref(), content);
        }
        backend
    }

    /// Create or replace a regular file (mode 0644), creating missing parents.
    pub fn add_file(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.insert(path, Node::new(NodeKind::File(content.into()), 0o644));
    }

    /// Create a directory (mode 0755), creating missing parents.
    pub fn add_dir(&self, path: &str) {
        self.insert(path, Node::new(NodeKind::Dir, 0o755));
    }

    /// Create a symbolic link at `path` pointing to `target`.
    pub fn add_symlink(&self, path: &str, target: &str) {
        self.insert(path, Node::new(NodeKind::Symlink(target.to_string()), 0o777));
    }

    /// Replace the permission bits of an existing node.
    pub fn set_permissions(&self, path: &str, permissions: u32) {
        if let Some(mut state) = self.lock() {
            if let Some(node) = state.nodes.get_mut(&normalize_path(path)) {
                node.permissions = permissions & 0o7777;
            }
        }
    }

    /// Current content of a regular file
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.read().ok()?;
        match &state.nodes.get(&normalize_path(path))?.kind {
            NodeKind::File(data) => Some(data.clone()),
            _ => None,
        }
    }

    /// Primitives called so far, oldest first
    pub fn calls(&self) -> Vec<Primitive> {
        self.state
            .read()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Some(mut state) = self.lock() {
            state.calls.clear();
        }
    }

    /// Number of descriptors currently open
    pub fn open_descriptors(&self) -> usize {
        self.state.read().map(|state| state.files.len()).unwrap_or(0)
    }

    fn lock(&self) -> Option<RwLockWriteGuard<'_, State>> {
        self.state.write().ok()
    }

    fn record(&self, primitive: Primitive) -> Option<RwLockWriteGuard<'_, State>> {
        let mut state = self.lock()?;
        state.calls.push(primitive);
        Some(state)
    }

    fn insert(&self, path: &str, node: Node) {
        let Some(mut state) = self.lock() else {
            return;
        };
        let path = normalize_path(path);
        let mut parent = parent_of(&path);
        while let Some(dir) = parent {
            if state.nodes.contains_key(&dir) {
                break;
            }
            parent = parent_of(&dir);
            state.nodes.insert(dir, Node::new(NodeKind::Dir, 0o755));
        }
        state.nodes.insert(path, node);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute, forward-slash path without a trailing separator
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { String::new() } else { "/".to_string() };
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parent_of(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(i) => Some(path[..i].to_string()),
        None => None,
    }
}

fn join_link(link: &str, target: &str) -> String {
    if target.starts_with('/') {
        return normalize_path(target);
    }
    let base = parent_of(link).unwrap_or_else(|| "/".to_string());
    if base == "/" {
        normalize_path(&format!("/{}", target))
    } else {
        normalize_path(&format!("{}/{}", base, target))
    }
}

fn is_child(dir: &str, candidate: &str) -> bool {
    if candidate == dir {
        return false;
    }
    let rest = if dir == "/" {
        candidate.strip_prefix('/')
    } else {
        candidate
            .strip_prefix(dir)
            .and_then(|rest| rest.strip_prefix('/'))
    };
    rest.is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn permits(permissions: u32, amode: i32) -> bool {
    let wanted = [(0x04, 0o400), (0x02, 0o200), (0x01, 0o100)];
    wanted
        .iter()
        .all(|&(flag, bit)| amode & flag == 0 || permissions & bit != 0)
}

fn span_fits(index: usize, count: usize, size: usize) -> bool {
    index.checked_add(count).is_some_and(|end| end <= size)
}

/// Copy file bytes starting at `offset` into `dst`; returns bytes copied
fn copy_out(data: &[u8], offset: u64, dst: &mut [u8]) -> usize {
    let start = usize::try_from(offset).map_or(data.len(), |offset| offset.min(data.len()));
    let n = dst.len().min(data.len() - start);
    dst[..n].copy_from_slice(&data[start..start + n]);
    n
}

/// Write `src` at `offset`, zero-filling any gap.
///
/// Returns false, leaving `data` untouched, when the file cannot grow that far.
fn copy_in(data: &mut Vec<u8>, offset: u64, src: &[u8]) -> bool {
    let Some(end) = usize::try_from(offset)
        .ok()
        .and_then(|start| start.checked_add(src.len()))
    else {
        return false;
    };
    if data.len() < end {
        if data.try_reserve(end - data.len()).is_err() {
            return false;
        }
        data.resize(end, 0);
    }
    data[end - src.len()..end].copy_from_slice(src);
    true
}

impl PlatformFileBackend for MemoryBackend {
    fn read(&self, fd: i32, array: &mut [u8], index: usize, count: usize) -> i64 {
        let Some(mut state) = self.record(Primitive::Read) else {
            return -1;
        };
        if !span_fits(index, count, array.len()) {
            return -1;
        }
        let Some((open, data)) = state.file_mut(fd) else {
            return -1;
        };
        if !open.mode.readable() {
            return -1;
        }
        let n = copy_out(data, open.cursor, &mut array[index..index + count]);
        open.cursor += n as u64;
        n as i64
    }

    unsafe fn pread(
        &self,
        fd: i32,
        ptr: *mut u8,
        index: usize,
        count: usize,
        size: usize,
    ) -> i64 {
        let Some(mut state) = self.record(Primitive::Pread) else {
            return -1;
        };
        if !span_fits(index, count, size) {
            return -1;
        }
        let Some((open, data)) = state.file_mut(fd) else {
            return -1;
        };
        if !open.mode.readable() {
            return -1;
        }
        // SAFETY: caller guarantees ptr is writable for size bytes; span checked.
        let dst = unsafe { std::slice::from_raw_parts_mut(ptr.add(index), count) };
        copy_out(data, index as u64, dst) as i64
    }

    fn write(&self, fd: i32, array: &[u8], index: usize, count: usize) -> i64 {
        let Some(mut state) = self.record(Primitive::Write) else {
            return -1;
        };
        if !span_fits(index, count, array.len()) {
            return -1;
        }
        let Some((open, data)) = state.file_mut(fd) else {
            return -1;
        };
        if !open.mode.writable() {
            return -1;
        }
        if !copy_in(data, open.cursor, &array[index..index + count]) {
            return -1;
        }
        open.cursor += count as u64;
        count as i64
    }

    unsafe fn pwrite(
        &self,
        fd: i32,
        ptr: *const u8,
        index: usize,
        count: usize,
        size: usize,
    ) -> i64 {
        let Some(mut state) = self.record(Primitive::Pwrite) else {
            return -1;
        };
        if !span_fits(index, count, size) {
            return -1;
        }
        let Some((open, data)) = state.file_mut(fd) else {
            return -1;
        };
        if !open.mode.writable() {
            return -1;
        }
        // SAFETY: caller guarantees ptr is readable for size bytes; span checked.
        let src = unsafe { std::slice::from_raw_parts(ptr.add(index), count) };
        if !copy_in(data, index as u64, src) {
            return -1;
        }
        count as i64
    }

    fn lseek(&self, fd: i32, offset: i64, whence: i32) -> i64 {
        let Some(mut state) = self.record(Primitive::Lseek) else {
            return -1;
        };
        let Some((open, data)) = state.file_mut(fd) else {
            return -1;
        };
        let base = match whence {
            0 => 0,
            1 => open.cursor as i64,
            2 => data.len() as i64,
            _ => return -1,
        };
        match base.checked_add(offset) {
            Some(target) if target >= 0 => {
                open.cursor = target as u64;
                target
            }
            _ => -1,
        }
    }

    fn close(&self, fd: i32) -> i32 {
        let Some(mut state) = self.record(Primitive::Close) else {
            return -1;
        };
        match state.files.remove(&fd) {
            Some(_) => 0,
            None => -1,
        }
    }

    fn access(&self, path: &str, amode: i32) -> i32 {
        let Some(state) = self.record(Primitive::Access) else {
            return -1;
        };
        match state.resolve(&normalize_path(path)) {
            Some((_, node)) if permits(node.permissions, amode) => 0,
            _ => -1,
        }
    }

    fn filetype(&self, path: &str) -> i32 {
        let Some(state) = self.record(Primitive::FileType) else {
            return -1;
        };
        state
            .nodes
            .get(&normalize_path(path))
            .map_or(-1, |node| node.file_type().code())
    }

    fn fileinfo(&self, path: &str) -> Option<FileInfo> {
        let state = self.record(Primitive::FileInfo)?;
        let node = state.nodes.get(&normalize_path(path))?;
        Some(FileInfo {
            file_type: node.file_type(),
            size: node.size(),
            permissions: node.permissions,
            owner: 0,
            group: 0,
            accessed: node.modified,
            modified: node.modified,
            changed: node.modified,
        })
    }

    fn readlink(&self, path: &str) -> Option<String> {
        let state = self.record(Primitive::ReadLink)?;
        match &state.nodes.get(&normalize_path(path))?.kind {
            NodeKind::Symlink(target) => Some(target.clone()),
            _ => None,
        }
    }

    fn open(&self, path: &str, mode: i32) -> i32 {
        let Some(mut state) = self.record(Primitive::Open) else {
            return -1;
        };
        let mode = AccessMode::from_raw(mode);
        let wanted = match mode {
            AccessMode::ReadOnly => 0x04,
            AccessMode::WriteOnly => 0x02,
            AccessMode::ReadWrite => 0x06,
        };
        let resolved = match state.resolve(&normalize_path(path)) {
            Some((resolved, node))
                if matches!(node.kind, NodeKind::File(_)) && permits(node.permissions, wanted) =>
            {
                resolved
            }
            _ => return -1,
        };
        let fd = state.next_fd;
        state.next_fd += 1;
        state.files.insert(
            fd,
            OpenFile {
                path: resolved,
                mode,
                cursor: 0,
            },
        );
        fd
    }

    fn opendir(&self, path: &str) -> usize {
        let Some(mut state) = self.record(Primitive::OpenDir) else {
            return 0;
        };
        let dir = match state.resolve(&normalize_path(path)) {
            Some((dir, node)) if matches!(node.kind, NodeKind::Dir) => dir,
            _ => return 0,
        };
        let entries: VecDeque<FileEntry> = state
            .nodes
            .iter()
            .filter(|(candidate, _)| is_child(&dir, candidate))
            .map(|(candidate, node)| FileEntry {
                name: candidate.rsplit('/').next().unwrap_or_default().to_string(),
                file_type: node.file_type(),
            })
            .collect();
        let handle = state.next_dir;
        state.next_dir += 1;
        state.dirs.insert(handle, entries);
        handle
    }

    fn readdir(&self, dir: usize) -> Option<FileEntry> {
        let mut state = self.record(Primitive::ReadDir)?;
        state.dirs.get_mut(&dir)?.pop_front()
    }

    fn closedir(&self, dir: usize) -> i32 {
        let Some(mut state) = self.record(Primitive::CloseDir) else {
            return -1;
        };
        match state.dirs.remove(&dir) {
            Some(_) => 0,
            None => -1,
        }
    }
}
