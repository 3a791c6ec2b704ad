//! Facade properties checked over the in-memory backend

use fsio::fs::Primitive;
use fsio::{
    AccessMode, BufferError, ByteBuffer, ByteOrder, DirectBuffer, FileSystem, FsError, HeapBuffer,
    LoggedBackend, MemoryBackend, SeekDirective,
};

fn sample() -> (FileSystem, MemoryBackend) {
    let memory = MemoryBackend::with_files([
        ("/data/a.bin", (0u8..64).collect::<Vec<_>>()),
        ("/data/b.txt", b"bee".to_vec()),
    ]);
    memory.add_symlink("/data/current", "a.bin");
    let fs = FileSystem::with_backend(LoggedBackend::new(memory.clone()));
    (fs, memory)
}

#[test]
fn test_copy_into_preserves_source_for_every_range() {
    let source = HeapBuffer::from_vec((0u8..16).collect());
    for start in 0..=16 {
        for end in start..=16 {
            let mut destination = DirectBuffer::allocate(16).unwrap();
            destination.set_position(16 - (end - start)).unwrap();
            source.copy_into(&mut destination, start..end).unwrap();

            assert_eq!(source.as_slice(), &(0u8..16).collect::<Vec<_>>()[..]);
            assert_eq!(
                &destination.as_slice()[16 - (end - start)..],
                &source.as_slice()[start..end]
            );
            assert_eq!(destination.remaining(), 0);
        }
    }
}

#[test]
fn test_load_outside_limit_fails() {
    let mut heap = HeapBuffer::new(8);
    let mut direct = DirectBuffer::allocate(8).unwrap();
    heap.set_limit(5).unwrap();
    direct.set_limit(5).unwrap();

    let buffers: [&dyn ByteBuffer; 2] = [&heap, &direct];
    for buffer in buffers {
        for offset in [5, 6, 8, 100, usize::MAX] {
            let err = buffer.load(offset).unwrap_err();
            assert!(err.is_index_out_of_range(), "{:?}", err);
        }
        assert!(buffer.load(4).is_ok());
    }
}

#[test]
fn test_scalars_follow_buffer_order() {
    let mut big = HeapBuffer::with_order(4, ByteOrder::BigEndian);
    let mut little = DirectBuffer::with_order(4, ByteOrder::LittleEndian).unwrap();
    big.store_u32(0, 0x0102_0304).unwrap();
    little.store_u32(0, 0x0102_0304).unwrap();
    assert_eq!(big.as_slice(), &[1, 2, 3, 4]);
    assert_eq!(little.as_slice(), &[4, 3, 2, 1]);
}

#[test]
fn test_dispatch_by_buffer_variant() {
    let (fs, memory) = sample();
    let fd = fs.open_file("/data/a.bin", AccessMode::ReadWrite).unwrap();

    memory.clear_calls();
    let mut heap = HeapBuffer::new(64);
    fs.read_file(fd, &mut heap, 0, 8).unwrap();
    fs.write_file(fd, &heap, 0, 8).unwrap();
    assert_eq!(memory.calls(), vec![Primitive::Read, Primitive::Write]);

    memory.clear_calls();
    let mut direct = DirectBuffer::allocate(64).unwrap();
    fs.read_file(fd, &mut direct, 0, 8).unwrap();
    fs.write_file(fd, &direct, 0, 8).unwrap();
    assert_eq!(memory.calls(), vec![Primitive::Pread, Primitive::Pwrite]);

    assert!(fs.close_file(fd));
}

#[test]
fn test_seek_set_zero_then_tell() {
    let (fs, _) = sample();
    for mode in [AccessMode::ReadOnly, AccessMode::WriteOnly, AccessMode::ReadWrite] {
        let fd = fs.open_file("/data/b.txt", mode).unwrap();
        fs.seek_file(fd, 2, SeekDirective::Set).unwrap();
        fs.seek_file(fd, 0, SeekDirective::Set).unwrap();
        assert_eq!(fs.tell_file(fd).unwrap(), 0);
        assert!(fs.close_file(fd));
    }
}

#[test]
fn test_opened_descriptor_is_usable() {
    let (fs, _) = sample();
    assert!(fs
        .open_file("/data/missing", AccessMode::ReadOnly)
        .unwrap_err()
        .is_not_found());

    let fd = fs.open_file("/data/current", AccessMode::ReadOnly).unwrap();
    let mut buf = HeapBuffer::new(4);
    assert_eq!(fs.read_file(fd, &mut buf, 0, 4).unwrap(), 4);
    assert_eq!(buf.as_slice(), &[0, 1, 2, 3]);
    assert!(fs.close_file(fd));
}

#[test]
fn test_check_exists_on_arbitrary_strings() {
    let (fs, _) = sample();
    let long = "x".repeat(10_000);
    let inputs = [
        "",
        " ",
        "\0",
        "/data/a.bin\0trailing",
        "../../..",
        "Z:\\foreign\\root",
        "//server/share",
        "\u{1F4C1}",
        long.as_str(),
    ];
    for input in inputs {
        assert!(!fs.check_exists(input), "{:?}", input);
        assert!(!fs.check_writable(input));
        assert!(!fs.check_executable(input));
    }
    assert!(fs.check_exists("/data/a.bin"));
}

#[test]
fn test_file_type_stable_and_missing() {
    let (fs, _) = sample();
    let first = fs.get_file_type("/data/current").unwrap();
    let second = fs.get_file_type("/data/current").unwrap();
    assert_eq!(first.code(), second.code());
    assert!(matches!(
        fs.get_file_type("/data/none"),
        Err(FsError::FileNotFound { .. })
    ));
}

#[test]
fn test_span_error_carries_bounds() {
    let (fs, _) = sample();
    let fd = fs.open_file("/data/a.bin", AccessMode::ReadOnly).unwrap();
    let mut buf = HeapBuffer::new(4);
    match fs.read_file(fd, &mut buf, 3, 2) {
        Err(FsError::IndexOutOfRange(BufferError::RangeOutOfBounds { start, end, limit })) => {
            assert_eq!((start, end, limit), (3, 5, 4));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(fs.tell_file(fd).unwrap(), 0);
    assert!(fs.close_file(fd));
}
