//! Nested output buffers for length-prefixed groups.
//!
//! The MMS encoding writes many "length of what follows" prefixes whose value
//! is only known once the group is complete. [`BufferStack`] lets the composer
//! open a nested buffer, write the group into it, close it, write the prefix
//! into the parent and then splice the group back in after the prefix:
//!
//! ```text
//! open_nested()            parent: [..]          nested: []
//! write group              parent: [..]          nested: [g g g]
//! close_nested()           parent: [..]          pending: [g g g]
//! write prefix             parent: [.. 3]        pending: [g g g]
//! commit_copy()            parent: [.. 3 g g g]
//! ```
//!
//! All buffers live in one arena. A nested buffer is the arena tail past its
//! frame offset, and a closed group is parked in a single reusable scratch
//! buffer until it is committed.

use crate::encoding::{checked_length, write_value_length};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
struct Frame {
    start: usize,
    generation: u64,
}

/// Stack of nested output buffers over a single arena.
#[derive(Debug, Default)]
pub struct BufferStack {
    arena: Vec<u8>,
    frames: Vec<Frame>,
    pending: Vec<u8>,
    has_pending: bool,
    next_generation: u64,
}

/// Snapshot of the live buffer position.
///
/// Only meaningful while the buffer it was taken in is still the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionMarker {
    position: usize,
    depth: usize,
    generation: u64,
}

impl BufferStack {
    /// Creates an empty stack with the root buffer live.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stack with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of open nested buffers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the write position in the live buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.arena.len() - self.live_start()
    }

    /// Returns true while a closed buffer awaits [`commit_copy`](Self::commit_copy).
    #[must_use]
    pub const fn has_pending_copy(&self) -> bool {
        self.has_pending
    }

    /// Returns the bytes of the live buffer.
    #[must_use]
    pub fn live(&self) -> &[u8] {
        &self.arena[self.live_start()..]
    }

    /// Gives the primitive encoders write access to the live buffer.
    pub(crate) fn out(&mut self) -> &mut Vec<u8> {
        &mut self.arena
    }

    /// Appends bytes to the live buffer.
    pub fn write(&mut self, bytes: &[u8]) {
        self.arena.extend_from_slice(bytes);
    }

    /// Appends one byte to the live buffer.
    pub fn push(&mut self, byte: u8) {
        self.arena.push(byte);
    }

    /// Suspends the live buffer and installs a fresh, empty one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PendingCopy`] if a closed buffer has not been
    /// committed yet.
    pub fn open_nested(&mut self) -> Result<()> {
        if self.has_pending {
            return Err(Error::PendingCopy);
        }
        self.next_generation += 1;
        self.frames.push(Frame {
            start: self.arena.len(),
            generation: self.next_generation,
        });
        Ok(())
    }

    /// Restores the parent buffer and parks the nested one for copying.
    ///
    /// Returns the length of the nested buffer. The caller usually writes a
    /// length prefix into the parent before calling
    /// [`commit_copy`](Self::commit_copy).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoOpenFrame`] at the root buffer and
    /// [`Error::PendingCopy`] if a previous close was not committed.
    pub fn close_nested(&mut self) -> Result<usize> {
        if self.has_pending {
            return Err(Error::PendingCopy);
        }
        let frame = self.frames.pop().ok_or(Error::NoOpenFrame)?;
        self.pending.clear();
        self.pending.extend_from_slice(&self.arena[frame.start..]);
        self.arena.truncate(frame.start);
        self.has_pending = true;
        Ok(self.pending.len())
    }

    /// Appends the parked nested buffer to the live buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPendingCopy`] if nothing was closed.
    pub fn commit_copy(&mut self) -> Result<()> {
        if !self.has_pending {
            return Err(Error::NoPendingCopy);
        }
        self.arena.extend_from_slice(&self.pending);
        self.pending.clear();
        self.has_pending = false;
        Ok(())
    }

    /// Captures the live buffer position and stack depth.
    #[must_use]
    pub fn mark(&self) -> PositionMarker {
        PositionMarker {
            position: self.arena.len(),
            depth: self.frames.len(),
            generation: self.live_generation(),
        }
    }

    /// Writes a value-length prefixed group.
    ///
    /// `write` fills a fresh nested buffer; its length is then written to the
    /// parent as a value-length, followed by the group itself. Returns the
    /// group length.
    ///
    /// On error the group is discarded and the stack is back at the depth it
    /// had before the call, with nothing pending.
    ///
    /// # Errors
    ///
    /// Propagates errors from `write` and reports stack misuse inside it.
    pub fn write_value_length_group<F>(&mut self, write: F) -> Result<usize>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.open_nested()?;
        let depth = self.frames.len();
        let result = self.fill_value_length_group(write);
        if result.is_err() {
            self.discard_group(depth);
        }
        result
    }

    /// Consumes the stack, returning the root buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PendingCopy`] if a closed buffer was not committed and
    /// [`Error::UnclosedBuffers`] if nested buffers are still open.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.has_pending {
            return Err(Error::PendingCopy);
        }
        if !self.frames.is_empty() {
            return Err(Error::UnclosedBuffers(self.frames.len()));
        }
        Ok(self.arena)
    }

    fn fill_value_length_group<F>(&mut self, write: F) -> Result<usize>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let start = self.mark();
        write(self)?;
        let length = start.length(self)?;
        self.close_nested()?;
        write_value_length(&mut self.arena, checked_length(length)?);
        self.commit_copy()?;
        Ok(length)
    }

    /// Drops the group frame opened at `depth` and everything above it.
    fn discard_group(&mut self, depth: usize) {
        if let Some(frame) = self.frames.get(depth - 1).copied() {
            self.arena.truncate(frame.start);
            self.frames.truncate(depth - 1);
        }
        self.pending.clear();
        self.has_pending = false;
    }

    fn live_start(&self) -> usize {
        self.frames.last().map_or(0, |frame| frame.start)
    }

    fn live_generation(&self) -> u64 {
        self.frames.last().map_or(0, |frame| frame.generation)
    }
}

impl PositionMarker {
    /// Returns the number of bytes written to the live buffer since the mark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleMarker`] if the stack depth changed since the
    /// mark and [`Error::StaleGeneration`] if the marker was taken in a
    /// sibling buffer that has since been closed.
    pub fn length(&self, stack: &BufferStack) -> Result<usize> {
        if stack.depth() != self.depth {
            return Err(Error::StaleMarker {
                marked_depth: self.depth,
                current_depth: stack.depth(),
            });
        }
        if stack.live_generation() != self.generation {
            return Err(Error::StaleGeneration {
                marked: self.generation,
                current: stack.live_generation(),
            });
        }
        Ok(stack.arena.len() - self.position)
    }

    /// Returns the stack depth recorded at the mark.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}
