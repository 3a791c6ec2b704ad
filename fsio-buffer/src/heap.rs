//! Heap-backed buffer

use crate::buffer::{BufferKind, BufferKindMut, ByteBuffer, Token};
use crate::cursor::Cursor;
use crate::order::ByteOrder;
use fsio_config::BufferConfig;

/// A buffer whose storage is an ordinary `Vec<u8>`.
///
/// The vector is allocated with the buffer and freed with it. I/O layers hand
/// the storage slice itself to the array-based primitives.
///
/// # Example
/// ```
/// use fsio_buffer::{ByteBuffer, HeapBuffer};
///
/// let mut buf = HeapBuffer::new(4);
/// buf.put_u16(0x0102).unwrap();
/// assert_eq!(&buf.array()[..2], &[0x01, 0x02]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapBuffer {
    data: Vec<u8>,
    cursor: Cursor,
}

impl HeapBuffer {
    /// Zero-filled buffer in the default (big-endian) order.
    pub fn new(capacity: usize) -> Self {
        Self::with_order(capacity, ByteOrder::default())
    }

    pub fn with_order(capacity: usize, order: ByteOrder) -> Self {
        Self {
            data: vec![0; capacity],
            cursor: Cursor::new(capacity, order),
        }
    }

    /// Buffer sized and ordered from configuration
    pub fn from_config(capacity: usize, config: &BufferConfig) -> Self {
        Self::with_order(capacity, config.byte_order.into())
    }

    /// Take ownership of existing bytes; capacity and limit are their length.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let cursor = Cursor::new(data.len(), ByteOrder::default());
        Self { data, cursor }
    }

    /// The whole backing array
    pub fn array(&self) -> &[u8] {
        &self.data
    }

    pub fn array_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Give the backing array back, discarding cursor state
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl ByteBuffer for HeapBuffer {
    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    fn storage(&self) -> &[u8] {
        &self.data
    }

    fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn variant(&self, _: Token) -> BufferKind<'_> {
        BufferKind::Heap(self)
    }

    fn variant_mut(&mut self, _: Token) -> BufferKindMut<'_> {
        BufferKindMut::Heap(self)
    }
}

impl From<Vec<u8>> for HeapBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StorageKind;
    use crate::error::BufferError;
    use fsio_config::ByteOrderSetting;

    #[test]
    fn test_new_is_zeroed() {
        let buf = HeapBuffer::new(8);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.limit(), 8);
        assert!(buf.array().iter().all(|&b| b == 0));
        assert!(matches!(buf.kind(), BufferKind::Heap(_)));
    }

    #[test]
    fn test_load_outside_limit() {
        let mut buf = HeapBuffer::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(buf.load(3).unwrap(), 4);
        assert_eq!(
            buf.load(4),
            Err(BufferError::IndexOutOfRange { index: 4, len: 4 })
        );

        buf.set_limit(2).unwrap();
        assert!(buf.load(2).unwrap_err().is_index_out_of_range());
        assert!(buf.load(usize::MAX).is_err());
    }

    #[test]
    fn test_byte_order_governs_scalars() {
        let mut big = HeapBuffer::with_order(4, ByteOrder::BigEndian);
        let mut little = HeapBuffer::with_order(4, ByteOrder::LittleEndian);
        big.store_u32(0, 0x0A0B_0C0D).unwrap();
        little.store_u32(0, 0x0A0B_0C0D).unwrap();
        assert_eq!(big.array(), &[0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(little.array(), &[0x0D, 0x0C, 0x0B, 0x0A]);

        // Same bytes, other order
        big.set_byte_order(ByteOrder::LittleEndian);
        assert_eq!(big.load_u32(0).unwrap(), 0x0D0C_0B0A);
    }

    #[test]
    fn test_copy_into_exact_and_source_unchanged() {
        let src = HeapBuffer::from_vec((0u8..32).collect());
        let before = src.clone();
        let mut dst = HeapBuffer::new(16);
        dst.put(0xFF).unwrap();

        src.copy_into(&mut dst, 4..12).unwrap();

        assert_eq!(src, before);
        assert_eq!(dst.position(), 9);
        assert_eq!(&dst.array()[1..9], &src.array()[4..12]);
        assert_eq!(dst.array()[0], 0xFF);
    }

    #[test]
    fn test_copy_into_range_past_limit() {
        let mut src = HeapBuffer::from_vec(vec![7; 10]);
        src.set_limit(5).unwrap();
        let mut dst = HeapBuffer::new(10);
        let err = src.copy_into(&mut dst, 2..6).unwrap_err();
        assert_eq!(
            err,
            BufferError::RangeOutOfBounds {
                start: 2,
                end: 6,
                limit: 5
            }
        );
        assert!(err.is_index_out_of_range());
        assert_eq!(dst.position(), 0);
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_copy_into_inverted_range() {
        let src = HeapBuffer::from_vec(vec![1; 8]);
        let mut dst = HeapBuffer::new(8);
        assert!(src.copy_into(&mut dst, 5..2).is_err());
    }

    #[test]
    fn test_copy_into_destination_too_small() {
        let src = HeapBuffer::from_vec(vec![1; 8]);
        let mut dst = HeapBuffer::new(8);
        dst.set_position(6).unwrap();
        let err = src.copy_into(&mut dst, 0..4).unwrap_err();
        assert_eq!(
            err,
            BufferError::InsufficientCapacity {
                needed: 4,
                remaining: 2
            }
        );
        assert!(dst.array().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_into_empty_range() {
        let src = HeapBuffer::from_vec(vec![1; 4]);
        let mut dst = HeapBuffer::new(0);
        src.copy_into(&mut dst, 4..4).unwrap();
        assert_eq!(dst.position(), 0);
    }

    #[test]
    fn test_from_config() {
        let config = BufferConfig {
            byte_order: ByteOrderSetting::Little,
            ..Default::default()
        };
        let buf = HeapBuffer::from_config(3, &config);
        assert_eq!(buf.byte_order(), ByteOrder::LittleEndian);
        assert_eq!(buf.capacity(), 3);
    }

    #[test]
    fn test_into_vec() {
        let mut buf = HeapBuffer::new(3);
        buf.put_slice(&[9, 8, 7]).unwrap();
        assert_eq!(buf.into_vec(), vec![9, 8, 7]);
    }
}
