//! ByteBuffer trait definition

use crate::cursor::Cursor;
use crate::direct::DirectBuffer;
use crate::error::{BufferError, BufferResult};
use crate::heap::HeapBuffer;
use crate::order::ByteOrder;
use std::ops::Range;

/// Shared view of a buffer's storage variant
pub enum BufferKind<'a> {
    Heap(&'a HeapBuffer),
    Direct(&'a DirectBuffer),
    /// Any implementation that is neither of the above
    Foreign,
}

/// Exclusive view of a buffer's storage variant
pub enum BufferKindMut<'a> {
    Heap(&'a mut HeapBuffer),
    Direct(&'a mut DirectBuffer),
    Foreign,
}

mod sealed {
    /// Unnameable outside this crate, so only this crate's buffers can
    /// override the variant hooks below.
    #[derive(Debug, Clone, Copy)]
    pub struct Token;
}

pub(crate) use sealed::Token;

/// Storage variant of any [`ByteBuffer`].
///
/// Blanket-implemented and backed by a sealed hook: a buffer defined outside
/// this crate always reports `Foreign`, whatever it wraps.
pub trait StorageKind {
    /// Shared variant view, for layers that must treat the variants differently
    fn kind(&self) -> BufferKind<'_>;

    /// Exclusive variant view
    fn kind_mut(&mut self) -> BufferKindMut<'_>;
}

impl<T: ByteBuffer + ?Sized> StorageKind for T {
    fn kind(&self) -> BufferKind<'_> {
        self.variant(Token)
    }

    fn kind_mut(&mut self) -> BufferKindMut<'_> {
        self.variant_mut(Token)
    }
}

/// Fixed-width scalars that can round-trip through a `u64`
trait Scalar: Sized {
    const WIDTH: usize;
    fn from_raw(raw: u64) -> Self;
    fn to_raw(self) -> u64;
}

macro_rules! impl_scalar {
    ($($ty:ty => $bits:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            fn from_raw(raw: u64) -> Self {
                raw as $bits as $ty
            }
            fn to_raw(self) -> u64 {
                self as $bits as u64
            }
        }
    )*};
}

impl_scalar!(u16 => u16, u32 => u32, u64 => u64, i16 => u16, i32 => u32, i64 => u64);

impl Scalar for f32 {
    const WIDTH: usize = 4;
    fn from_raw(raw: u64) -> Self {
        f32::from_bits(raw as u32)
    }
    fn to_raw(self) -> u64 {
        u64::from(self.to_bits())
    }
}

impl Scalar for f64 {
    const WIDTH: usize = 8;
    fn from_raw(raw: u64) -> Self {
        f64::from_bits(raw)
    }
    fn to_raw(self) -> u64 {
        self.to_bits()
    }
}

macro_rules! scalar_accessors {
    ($($ty:ty => $load:ident, $store:ident, $get:ident, $put:ident;)*) => {$(
        #[doc = concat!("Read a `", stringify!($ty), "` at `offset` in the buffer's byte order.")]
        fn $load(&self, offset: usize) -> BufferResult<$ty> {
            self.load_raw(offset, <$ty as Scalar>::WIDTH).map(<$ty as Scalar>::from_raw)
        }

        #[doc = concat!("Write a `", stringify!($ty), "` at `offset` in the buffer's byte order.")]
        fn $store(&mut self, offset: usize, value: $ty) -> BufferResult<()> {
            self.store_raw(offset, <$ty as Scalar>::WIDTH, value.to_raw())
        }

        #[doc = concat!("Read a `", stringify!($ty), "` at the position and advance past it.")]
        fn $get(&mut self) -> BufferResult<$ty> {
            let at = self.cursor_mut().take(<$ty as Scalar>::WIDTH)?;
            self.$load(at)
        }

        #[doc = concat!("Write a `", stringify!($ty), "` at the position and advance past it.")]
        fn $put(&mut self, value: $ty) -> BufferResult<()> {
            let at = self.cursor_mut().reserve(<$ty as Scalar>::WIDTH)?;
            self.$store(at, value)
        }
    )*};
}

/// Fixed-capacity byte sequence with position, limit, mark and byte order.
///
/// Implementors provide the cursor and the raw storage; every access method
/// is provided on top of those and checks bounds against the limit.
///
/// # Implementations
/// - `HeapBuffer`: storage in a `Vec<u8>`
/// - `DirectBuffer`: storage in a raw allocation
pub trait ByteBuffer {
    /// Cursor state
    fn cursor(&self) -> &Cursor;

    /// Mutable cursor state
    fn cursor_mut(&mut self) -> &mut Cursor;

    /// The whole storage, `capacity` bytes long
    fn storage(&self) -> &[u8];

    /// The whole storage, mutable
    fn storage_mut(&mut self) -> &mut [u8];

    #[doc(hidden)]
    fn variant(&self, _: Token) -> BufferKind<'_> {
        BufferKind::Foreign
    }

    #[doc(hidden)]
    fn variant_mut(&mut self, _: Token) -> BufferKindMut<'_> {
        BufferKindMut::Foreign
    }

    fn capacity(&self) -> usize {
        self.cursor().capacity()
    }

    fn limit(&self) -> usize {
        self.cursor().limit()
    }

    fn position(&self) -> usize {
        self.cursor().position()
    }

    fn remaining(&self) -> usize {
        self.cursor().remaining()
    }

    fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    fn byte_order(&self) -> ByteOrder {
        self.cursor().byte_order()
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.cursor_mut().set_byte_order(order);
    }

    fn set_position(&mut self, position: usize) -> BufferResult<()> {
        self.cursor_mut().set_position(position)
    }

    fn set_limit(&mut self, limit: usize) -> BufferResult<()> {
        self.cursor_mut().set_limit(limit)
    }

    fn mark(&mut self) {
        self.cursor_mut().mark();
    }

    fn reset(&mut self) -> BufferResult<()> {
        self.cursor_mut().reset()
    }

    fn clear(&mut self) {
        self.cursor_mut().clear();
    }

    fn flip(&mut self) {
        self.cursor_mut().flip();
    }

    fn rewind(&mut self) {
        self.cursor_mut().rewind();
    }

    /// Bytes in `[0, limit)`
    fn as_slice(&self) -> &[u8] {
        &self.storage()[..self.limit()]
    }

    /// Read the byte at `offset`; fails unless `offset` is in `[0, limit)`.
    fn load(&self, offset: usize) -> BufferResult<u8> {
        if offset >= self.limit() {
            return Err(BufferError::IndexOutOfRange {
                index: offset,
                len: self.limit(),
            });
        }
        Ok(self.storage()[offset])
    }

    /// Write the byte at `offset`; same bounds as [`ByteBuffer::load`].
    fn store(&mut self, offset: usize, value: u8) -> BufferResult<()> {
        if offset >= self.limit() {
            return Err(BufferError::IndexOutOfRange {
                index: offset,
                len: self.limit(),
            });
        }
        self.storage_mut()[offset] = value;
        Ok(())
    }

    /// Read the byte at the position and advance
    fn get(&mut self) -> BufferResult<u8> {
        let at = self.cursor_mut().take(1)?;
        Ok(self.storage()[at])
    }

    /// Write a byte at the position and advance
    fn put(&mut self, value: u8) -> BufferResult<()> {
        let at = self.cursor_mut().reserve(1)?;
        self.storage_mut()[at] = value;
        Ok(())
    }

    /// Fill `dst` from the position and advance past the bytes read
    fn get_slice(&mut self, dst: &mut [u8]) -> BufferResult<()> {
        let at = self.cursor_mut().take(dst.len())?;
        dst.copy_from_slice(&self.storage()[at..at + dst.len()]);
        Ok(())
    }

    /// Copy `src` in at the position and advance past it
    fn put_slice(&mut self, src: &[u8]) -> BufferResult<()> {
        let at = self.cursor_mut().reserve(src.len())?;
        self.storage_mut()[at..at + src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Copy `range` of this buffer's valid data into `destination` at its
    /// position, advancing the destination. This buffer is left untouched.
    ///
    /// Fails without writing anything if `range` is not inside `[0, limit)`
    /// or the destination has fewer than `range.len()` bytes remaining.
    fn copy_into(&self, destination: &mut dyn ByteBuffer, range: Range<usize>) -> BufferResult<()> {
        if range.start > range.end || range.end > self.limit() {
            return Err(BufferError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                limit: self.limit(),
            });
        }
        let len = range.len();
        if len > destination.remaining() {
            return Err(BufferError::InsufficientCapacity {
                needed: len,
                remaining: destination.remaining(),
            });
        }
        let at = destination.cursor_mut().reserve(len)?;
        destination.storage_mut()[at..at + len].copy_from_slice(&self.storage()[range]);
        Ok(())
    }

    /// Read `width` (≤ 8) bytes at `offset` as an unsigned value
    fn load_raw(&self, offset: usize, width: usize) -> BufferResult<u64> {
        let end = self.checked_end(offset, width)?;
        Ok(self.byte_order().decode(&self.storage()[offset..end]))
    }

    /// Write the low `width` (≤ 8) bytes of `value` at `offset`
    fn store_raw(&mut self, offset: usize, width: usize, value: u64) -> BufferResult<()> {
        let end = self.checked_end(offset, width)?;
        let order = self.byte_order();
        order.encode(value, &mut self.storage_mut()[offset..end]);
        Ok(())
    }

    #[doc(hidden)]
    fn checked_end(&self, offset: usize, width: usize) -> BufferResult<usize> {
        match offset.checked_add(width) {
            Some(end) if end <= self.limit() => Ok(end),
            _ => Err(BufferError::IndexOutOfRange {
                index: offset,
                len: self.limit(),
            }),
        }
    }

    scalar_accessors! {
        u16 => load_u16, store_u16, get_u16, put_u16;
        u32 => load_u32, store_u32, get_u32, put_u32;
        u64 => load_u64, store_u64, get_u64, put_u64;
        i16 => load_i16, store_i16, get_i16, put_i16;
        i32 => load_i32, store_i32, get_i32, put_i32;
        i64 => load_i64, store_i64, get_i64, put_i64;
        f32 => load_f32, store_f32, get_f32, put_f32;
        f64 => load_f64, store_f64, get_f64, put_f64;
    }
}
