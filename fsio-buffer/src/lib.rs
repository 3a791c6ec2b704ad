//! fsio byte buffers
//!
//! Fixed-capacity byte sequences with position/limit/mark bookkeeping and an
//! explicit byte order.
//!
//! # Variants
//! - [`HeapBuffer`]: storage is an ordinary `Vec<u8>`
//! - [`DirectBuffer`]: storage is a raw region from the global allocator,
//!   released exactly once when the buffer is dropped
//!
//! Both implement [`ByteBuffer`]. I/O layers that need to tell them apart go
//! through [`StorageKind::kind`] / [`StorageKind::kind_mut`], which is a
//! closed set: any other implementation reports itself as `Foreign`.
//!
//! # Usage
//! ```rust
//! use fsio_buffer::{ByteBuffer, ByteOrder, HeapBuffer};
//!
//! let mut buf = HeapBuffer::with_order(8, ByteOrder::LittleEndian);
//! buf.put_u32(0xCAFE_BABE).unwrap();
//! buf.flip();
//! assert_eq!(buf.load(0).unwrap(), 0xBE);
//! assert_eq!(buf.get_u32().unwrap(), 0xCAFE_BABE);
//! ```

mod buffer;
mod cursor;
mod direct;
mod error;
mod heap;
mod order;

pub use buffer::{BufferKind, BufferKindMut, ByteBuffer, StorageKind};
pub use cursor::Cursor;
pub use direct::{DirectBuffer, DEFAULT_ALIGNMENT};
pub use error::{BufferError, BufferResult};
pub use heap::HeapBuffer;
pub use order::ByteOrder;
