//! Position/limit/mark bookkeeping shared by every buffer variant

use crate::error::{BufferError, BufferResult};
use crate::order::ByteOrder;

/// Buffer cursor state.
///
/// Keeps `mark <= position <= limit <= capacity` after every call; setters
/// that would break it either fail or drag the dependent fields along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    capacity: usize,
    limit: usize,
    position: usize,
    mark: Option<usize>,
    order: ByteOrder,
}

impl Cursor {
    /// Fresh cursor: position 0, limit at capacity, no mark
    pub fn new(capacity: usize, order: ByteOrder) -> Self {
        Self {
            capacity,
            limit: capacity,
            position: 0,
            mark: None,
            order,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn mark_position(&self) -> Option<usize> {
        self.mark
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Bytes between position and limit
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Move the position. Drops the mark if it would end up past the position.
    pub fn set_position(&mut self, position: usize) -> BufferResult<()> {
        if position > self.limit {
            return Err(BufferError::IndexOutOfRange {
                index: position,
                len: self.limit,
            });
        }
        self.position = position;
        if self.mark.is_some_and(|m| m > position) {
            self.mark = None;
        }
        Ok(())
    }

    /// Move the limit. Clamps the position and drops a mark beyond the new limit.
    pub fn set_limit(&mut self, limit: usize) -> BufferResult<()> {
        if limit > self.capacity {
            return Err(BufferError::IndexOutOfRange {
                index: limit,
                len: self.capacity,
            });
        }
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
        if self.mark.is_some_and(|m| m > limit) {
            self.mark = None;
        }
        Ok(())
    }

    pub fn mark(&mut self) {
        self.mark = Some(self.position);
    }

    pub fn reset(&mut self) -> BufferResult<()> {
        let mark = self.mark.ok_or(BufferError::InvalidMark)?;
        self.position = mark;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity;
        self.mark = None;
    }

    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
        self.mark = None;
    }

    pub fn rewind(&mut self) {
        self.position = 0;
        self.mark = None;
    }

    /// Reserve `width` bytes at the position for a relative read and advance
    /// past them. Returns the offset the bytes start at.
    pub(crate) fn take(&mut self, width: usize) -> BufferResult<usize> {
        if self.remaining() < width {
            return Err(BufferError::BufferUnderflow);
        }
        let at = self.position;
        self.position += width;
        Ok(at)
    }

    /// Same as [`Cursor::take`] for relative writes.
    pub(crate) fn reserve(&mut self, width: usize) -> BufferResult<usize> {
        if self.remaining() < width {
            return Err(BufferError::BufferOverflow);
        }
        let at = self.position;
        self.position += width;
        Ok(at)
    }
}
