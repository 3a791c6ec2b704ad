//! Direct (raw memory) buffer

use crate::buffer::{BufferKind, BufferKindMut, ByteBuffer, Token};
use crate::cursor::Cursor;
use crate::error::{BufferError, BufferResult};
use crate::order::ByteOrder;
use fsio_config::BufferConfig;
use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use tracing::trace;

/// Alignment used when none is configured
pub const DEFAULT_ALIGNMENT: usize = 8;

/// A buffer whose storage is a raw region taken from the global allocator.
///
/// The region is zeroed on allocation and owned exclusively by the buffer;
/// `Drop` hands it back exactly once, on every exit path. The address/size
/// pair is exposed so positioned I/O primitives can fill or drain the region
/// without an intermediate copy.
pub struct DirectBuffer {
    ptr: NonNull<u8>,
    // None for zero-capacity buffers, which own no allocation
    layout: Option<Layout>,
    cursor: Cursor,
}

// The region is owned, never aliased, and only reachable through `&self`/`&mut self`.
unsafe impl Send for DirectBuffer {}

impl DirectBuffer {
    /// Allocate a zeroed region in the default (big-endian) order.
    pub fn allocate(capacity: usize) -> BufferResult<Self> {
        Self::allocate_aligned(capacity, DEFAULT_ALIGNMENT, ByteOrder::default())
    }

    pub fn with_order(capacity: usize, order: ByteOrder) -> BufferResult<Self> {
        Self::allocate_aligned(capacity, DEFAULT_ALIGNMENT, order)
    }

    /// Buffer ordered and aligned from configuration
    pub fn from_config(capacity: usize, config: &BufferConfig) -> BufferResult<Self> {
        Self::allocate_aligned(capacity, config.direct_alignment, config.byte_order.into())
    }

    /// Allocate with an explicit alignment (must be a power of two).
    pub fn allocate_aligned(capacity: usize, align: usize, order: ByteOrder) -> BufferResult<Self> {
        let cursor = Cursor::new(capacity, order);
        if capacity == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                layout: None,
                cursor,
            });
        }

        let layout = Layout::from_size_align(capacity, align)
            .map_err(|_| BufferError::Allocation { capacity })?;
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(BufferError::Allocation { capacity })?;
        trace!(target: "fsio::buffer", capacity, align, address = raw as usize, "direct buffer allocated");

        Ok(Self {
            ptr,
            layout: Some(layout),
            cursor,
        })
    }

    /// Start of the region
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Region start as an integer, for diagnostics
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Region length in bytes (the capacity)
    pub fn size(&self) -> usize {
        self.cursor.capacity()
    }
}

impl ByteBuffer for DirectBuffer {
    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    fn storage(&self) -> &[u8] {
        // SAFETY: ptr is valid for `size()` initialized bytes (zeroed at
        // allocation, dangling-but-aligned when size is 0) for as long as self lives.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size()) }
    }

    fn storage_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above; &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size()) }
    }

    fn variant(&self, _: Token) -> BufferKind<'_> {
        BufferKind::Direct(self)
    }

    fn variant_mut(&mut self, _: Token) -> BufferKindMut<'_> {
        BufferKindMut::Direct(self)
    }
}

impl Drop for DirectBuffer {
    fn drop(&mut self) {
        if let Some(layout) = self.layout.take() {
            trace!(target: "fsio::buffer", address = self.address(), size = layout.size(), "direct buffer released");
            // SAFETY: ptr came from alloc_zeroed with this exact layout and
            // `take()` makes a second release impossible.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

impl fmt::Debug for DirectBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectBuffer")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("cursor", &self.cursor)
            .finish()
    }
}
