//! Subcommand implementations
//!
//! Each command goes through the facade only and writes its report to the
//! supplied writer.

use crate::error::{CliError, CliResult};
use fsio_buffer::{ByteBuffer, DirectBuffer, HeapBuffer};
use fsio_config::Config;
use fsio_fs::{AccessMode, FileDescriptor, FileSystem, SeekDirective};
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

const TARGET: &str = "fsio::cli";

/// Runs subcommands against one facade with one configuration
pub struct Runner<'a> {
    fs: FileSystem,
    config: &'a Config,
    direct: bool,
}

impl<'a> Runner<'a> {
    /// `direct` selects direct buffers (positioned I/O) instead of heap buffers.
    pub fn new(fs: FileSystem, config: &'a Config, direct: bool) -> Self {
        Self { fs, config, direct }
    }

    /// Copy `length` bytes (default: to end of file) starting at `offset` to `out`.
    pub fn cat(
        &self,
        path: &str,
        offset: u64,
        length: Option<u64>,
        out: &mut dyn Write,
    ) -> CliResult<u64> {
        let fd = self.fs.open_file(path, AccessMode::ReadOnly)?;
        let result = if self.direct {
            self.cat_direct(fd, offset, length, out)
        } else {
            self.cat_heap(fd, offset, length, out)
        };
        self.fs.close_file(fd);
        let copied = result?;
        info!(target: TARGET, path, copied, direct = self.direct, "cat");
        Ok(copied)
    }

    fn cat_heap(
        &self,
        fd: FileDescriptor,
        offset: u64,
        length: Option<u64>,
        out: &mut dyn Write,
    ) -> CliResult<u64> {
        if offset > 0 {
            let position = i64::try_from(offset).map_err(|_| CliError::OffsetTooLarge(offset))?;
            self.fs.seek_file(fd, position, SeekDirective::Set)?;
        }
        let chunk = self.chunk_size();
        let mut buf = HeapBuffer::from_config(chunk, &self.config.buffer);
        let mut left = length.unwrap_or(u64::MAX);
        let mut copied = 0;
        while left > 0 {
            let want = left.min(chunk as u64) as usize;
            let n = self.fs.read_file(fd, &mut buf, 0, want)? as usize;
            if n == 0 {
                break;
            }
            out.write_all(&buf.as_slice()[..n])?;
            left -= n as u64;
            copied += n as u64;
        }
        Ok(copied)
    }

    /// The buffer mirrors the file from offset 0, so only `[offset, end)` is
    /// filled and written out. The size comes from the open descriptor, which
    /// has already followed any symlink.
    fn cat_direct(
        &self,
        fd: FileDescriptor,
        offset: u64,
        length: Option<u64>,
        out: &mut dyn Write,
    ) -> CliResult<u64> {
        let size = self.fs.seek_file(fd, 0, SeekDirective::End)?;
        let end = match length {
            Some(length) => offset.saturating_add(length).min(size),
            None => size,
        };
        if offset >= end {
            return Ok(0);
        }
        let capacity = usize::try_from(end).map_err(|_| CliError::OffsetTooLarge(end))?;
        let mut buf = DirectBuffer::from_config(capacity, &self.config.buffer)?;
        debug!(target: TARGET, capacity = buf.capacity(), "direct window");

        let chunk = self.chunk_size();
        // offset < end, which fits in usize
        let start = offset as usize;
        let mut position = start;
        while position < buf.limit() {
            let want = (buf.limit() - position).min(chunk);
            let n = self.fs.read_file(fd, &mut buf, position, want)? as usize;
            if n == 0 {
                break;
            }
            position += n;
        }
        out.write_all(&buf.as_slice()[start..position])?;
        Ok((position - start) as u64)
    }

    /// Overwrite the start of an existing file with `data`.
    pub fn write(&self, path: &str, data: &[u8], out: &mut dyn Write) -> CliResult<u64> {
        let fd = self.fs.open_file(path, AccessMode::WriteOnly)?;
        let result = if self.direct {
            DirectBuffer::from_config(data.len(), &self.config.buffer)
                .map_err(Into::into)
                .and_then(|mut buf| {
                    buf.put_slice(data)?;
                    self.write_all(fd, &buf)
                })
        } else {
            let mut buf = HeapBuffer::from_config(data.len(), &self.config.buffer);
            buf.put_slice(data)
                .map_err(Into::into)
                .and_then(|_| self.write_all(fd, &buf))
        };
        self.fs.close_file(fd);
        let written = result?;
        writeln!(out, "{} bytes written to {}", written, path)?;
        Ok(written)
    }

    fn write_all(&self, fd: FileDescriptor, buf: &dyn ByteBuffer) -> CliResult<u64> {
        let mut index = 0;
        while index < buf.limit() {
            let n = self.fs.write_file(fd, buf, index, buf.limit() - index)? as usize;
            if n == 0 {
                break;
            }
            index += n;
        }
        Ok(index as u64)
    }

    pub fn stat(&self, path: &str, json: bool, out: &mut dyn Write) -> CliResult<()> {
        let info = self.fs.get_file_info(path)?;
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
            return Ok(());
        }
        writeln!(out, "  File: {}", path)?;
        writeln!(out, "  Type: {}", info.file_type)?;
        writeln!(out, "  Size: {}", info.size)?;
        writeln!(out, "  Mode: {:04o}", info.permissions)?;
        writeln!(out, "   Uid: {}  Gid: {}", info.owner, info.group)?;
        writeln!(out, "Access: {}", epoch_seconds(info.accessed))?;
        writeln!(out, "Modify: {}", epoch_seconds(info.modified))?;
        writeln!(out, "Change: {}", epoch_seconds(info.changed))?;
        Ok(())
    }

    pub fn file_type(&self, path: &str, out: &mut dyn Write) -> CliResult<()> {
        writeln!(out, "{}", self.fs.get_file_type(path)?)?;
        Ok(())
    }

    /// List a directory, one `type<TAB>name` line per entry, sorted by name.
    pub fn ls(&self, path: &str, out: &mut dyn Write) -> CliResult<usize> {
        let handle = self.fs.open_dir(path)?;
        let mut entries: Vec<_> = self.fs.entries(handle).collect();
        self.fs.close_dir(handle);

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        for entry in &entries {
            writeln!(out, "{}\t{}", entry.file_type, entry.name)?;
        }
        Ok(entries.len())
    }

    pub fn readlink(&self, path: &str, out: &mut dyn Write) -> CliResult<()> {
        writeln!(out, "{}", self.fs.get_link_target(path)?)?;
        Ok(())
    }

    pub fn access(&self, path: &str, out: &mut dyn Write) -> CliResult<()> {
        let probes = [
            ("exists", self.fs.check_exists(path)),
            ("readable", self.fs.check_readable(path)),
            ("writable", self.fs.check_writable(path)),
            ("executable", self.fs.check_executable(path)),
        ];
        for (name, granted) in probes {
            writeln!(out, "{:<10} {}", name, if granted { "yes" } else { "no" })?;
        }
        Ok(())
    }

    fn chunk_size(&self) -> usize {
        self.config.io.chunk_size.max(1)
    }
}

fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsio_fs::{FsError, MemoryBackend, Primitive};

    fn small_chunks() -> Config {
        let mut config = Config::default();
        config.io.chunk_size = 3;
        config
    }

    fn setup() -> (FileSystem, MemoryBackend) {
        let memory = MemoryBackend::with_files([
            ("/docs/readme.txt", b"hello, fsio!".to_vec()),
            ("/docs/empty", Vec::new()),
        ]);
        memory.add_symlink("/docs/latest", "readme.txt");
        (FileSystem::with_backend(memory.clone()), memory)
    }

    fn run<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> CliResult<()>,
    {
        let mut out: Vec<u8> = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cat_heap_in_chunks() {
        let (fs, memory) = setup();
        let config = small_chunks();
        let runner = Runner::new(fs, &config, false);

        let mut out: Vec<u8> = Vec::new();
        assert_eq!(runner.cat("/docs/readme.txt", 0, None, &mut out).unwrap(), 12);
        assert_eq!(out, b"hello, fsio!");
        assert!(memory.calls().contains(&Primitive::Read));
        assert!(!memory.calls().contains(&Primitive::Pread));
        assert_eq!(memory.open_descriptors(), 0);
    }

    #[test]
    fn test_cat_window() {
        let (fs, _) = setup();
        let config = small_chunks();
        for direct in [false, true] {
            let runner = Runner::new(fs.clone(), &config, direct);
            let mut out: Vec<u8> = Vec::new();
            assert_eq!(runner.cat("/docs/readme.txt", 7, Some(4), &mut out).unwrap(), 4);
            assert_eq!(out, b"fsio", "direct = {}", direct);
        }
    }

    #[test]
    fn test_cat_direct_uses_positioned_reads() {
        let (fs, memory) = setup();
        let config = small_chunks();
        let runner = Runner::new(fs, &config, true);

        let mut out: Vec<u8> = Vec::new();
        assert_eq!(runner.cat("/docs/readme.txt", 0, None, &mut out).unwrap(), 12);
        assert_eq!(out, b"hello, fsio!");
        assert!(memory.calls().contains(&Primitive::Pread));
        assert!(!memory.calls().contains(&Primitive::Read));
    }

    #[test]
    fn test_cat_through_symlink() {
        let (fs, _) = setup();
        let config = small_chunks();
        for direct in [false, true] {
            let runner = Runner::new(fs.clone(), &config, direct);
            let mut out: Vec<u8> = Vec::new();
            assert_eq!(runner.cat("/docs/latest", 0, None, &mut out).unwrap(), 12);
            assert_eq!(out, b"hello, fsio!", "direct = {}", direct);

            out.clear();
            assert_eq!(runner.cat("/docs/latest", 7, None, &mut out).unwrap(), 5);
            assert_eq!(out, b"fsio!", "direct = {}", direct);
        }
    }

    #[test]
    fn test_cat_offset_beyond_seek_range() {
        let (fs, memory) = setup();
        let config = Config::default();
        let runner = Runner::new(fs, &config, false);
        let offset = i64::MAX as u64 + 1;
        let err = runner
            .cat("/docs/readme.txt", offset, None, &mut std::io::sink())
            .unwrap_err();
        assert!(matches!(err, CliError::OffsetTooLarge(o) if o == offset));
        assert!(!memory.calls().contains(&Primitive::Lseek));
        assert_eq!(memory.open_descriptors(), 0);
    }

    #[test]
    fn test_cat_empty_and_past_end() {
        let (fs, _) = setup();
        let config = Config::default();
        for direct in [false, true] {
            let runner = Runner::new(fs.clone(), &config, direct);
            let mut out: Vec<u8> = Vec::new();
            assert_eq!(runner.cat("/docs/empty", 0, None, &mut out).unwrap(), 0);
            assert_eq!(runner.cat("/docs/readme.txt", 100, None, &mut out).unwrap(), 0);
            assert!(out.is_empty());
        }
    }

    #[test]
    fn test_cat_missing_file() {
        let (fs, _) = setup();
        let config = Config::default();
        let runner = Runner::new(fs, &config, false);
        let err = runner.cat("/nope", 0, None, &mut std::io::sink()).unwrap_err();
        assert!(matches!(err, CliError::Fs(FsError::FileNotFound { .. })));
        assert_eq!(err.to_string(), "file not found: /nope");
    }

    #[test]
    fn test_write_heap_and_direct() {
        let (fs, memory) = setup();
        let config = small_chunks();

        let runner = Runner::new(fs.clone(), &config, false);
        let report = run(|out| runner.write("/docs/readme.txt", b"HELLO", out).map(|_| ()));
        assert_eq!(report, "5 bytes written to /docs/readme.txt\n");
        assert_eq!(memory.contents("/docs/readme.txt").unwrap(), b"HELLO, fsio!");

        let runner = Runner::new(fs, &config, true);
        runner.write("/docs/empty", b"abc", &mut std::io::sink()).unwrap();
        assert_eq!(memory.contents("/docs/empty").unwrap(), b"abc");
        assert!(memory.calls().contains(&Primitive::Pwrite));
    }

    #[test]
    fn test_write_never_creates() {
        let (fs, memory) = setup();
        let config = Config::default();
        let runner = Runner::new(fs, &config, false);
        assert!(runner.write("/docs/new.txt", b"x", &mut std::io::sink()).is_err());
        assert!(memory.contents("/docs/new.txt").is_none());
    }

    #[test]
    fn test_stat_text_and_json() {
        let (fs, _) = setup();
        let config = Config::default();
        let runner = Runner::new(fs, &config, false);

        let text = run(|out| runner.stat("/docs/readme.txt", false, out));
        assert!(text.contains("  Type: regular"));
        assert!(text.contains("  Size: 12"));
        assert!(text.contains("  Mode: 0644"));

        let json = run(|out| runner.stat("/docs/readme.txt", true, out));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["size"], 12);
        assert_eq!(value["file_type"], "regular");
    }

    #[test]
    fn test_type_ls_readlink_access() {
        let (fs, _) = setup();
        let config = Config::default();
        let runner = Runner::new(fs, &config, false);

        assert_eq!(run(|out| runner.file_type("/docs/latest", out)), "symlink\n");
        assert_eq!(
            run(|out| runner.ls("/docs", out).map(|_| ())),
            "regular\tempty\nsymlink\tlatest\nregular\treadme.txt\n"
        );
        assert_eq!(run(|out| runner.readlink("/docs/latest", out)), "readme.txt\n");

        let access = run(|out| runner.access("/docs/readme.txt", out));
        assert!(access.contains("exists     yes"));
        assert!(access.contains("executable no"));

        let err = runner.readlink("/docs/readme.txt", &mut std::io::sink()).unwrap_err();
        assert!(matches!(err, CliError::Fs(FsError::NotALink { .. })));
    }

    #[test]
    fn test_epoch_seconds() {
        assert_eq!(epoch_seconds(UNIX_EPOCH), 0);
        assert_eq!(
            epoch_seconds(UNIX_EPOCH - std::time::Duration::from_secs(5)),
            -5
        );
    }
}
