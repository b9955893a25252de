//! The read-ahead buffer that backs every decoding step.
//!
//! [`StreamBuffer`] gives step authors the illusion of an infinite,
//! markable byte stream while only ever holding one fixed-size chunk (plus a
//! small pending spill) in memory. It supports three kinds of reads:
//!
//! - [`read_byte`](StreamBuffer::read_byte): a single byte,
//! - [`read_exact`](StreamBuffer::read_exact): exactly `n` bytes, refilling
//!   from the source as many times as needed,
//! - [`take_marked`](StreamBuffer::take_marked): every byte observed since
//!   the last [`mark`](StreamBuffer::mark), minus a trailing discard count,
//!   reconstructed correctly even when the marked span was overwritten by
//!   one or more refills in between.
//!
//! Refills are driven entirely by demand: the source is consulted only when
//! a read runs past the bytes currently in the window.

use alloc::{boxed::Box, vec, vec::Vec};
use core::fmt;

use bstr::BStr;
use tracing::trace;

use crate::{
    error::DecodeError,
    scratch::{Scratch, ScratchValue},
    source::ByteSource,
};

/// A self-refilling window over a pull-based byte source.
///
/// One `StreamBuffer` lives for the duration of a stream session. Its
/// scratch store is ephemeral per message; the driver clears it at each
/// message boundary.
pub struct StreamBuffer<S> {
    src: S,
    buf: Box<[u8]>,
    /// Next unread offset. Invariant: `cur <= limit`.
    cur: usize,
    /// Valid bytes from the last fill. Invariant: `limit <= buf.len()`.
    limit: usize,
    /// Capture start, `None` when unset. Invariant when set: `mark <= cur`.
    mark: Option<usize>,
    /// Marked bytes already evicted from `buf` by intervening refills.
    pending: Vec<u8>,
    scratch: Scratch,
}

impl<S: ByteSource> StreamBuffer<S> {
    /// Creates a buffer with a fixed internal window of `capacity` bytes,
    /// refilled on demand from `src`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, src: S) -> Self {
        assert!(capacity > 0, "buffer capacity must be at least 1");
        Self {
            src,
            buf: vec![0; capacity].into_boxed_slice(),
            cur: 0,
            limit: 0,
            mark: None,
            pending: Vec::new(),
            scratch: Scratch::new(),
        }
    }

    /// Size of the internal window.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Unread bytes currently sitting in the window.
    #[must_use]
    pub fn available(&self) -> usize {
        self.limit - self.cur
    }

    /// Reads a single byte, refilling from the source first if the window is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// [`DecodeError::EndOfStream`] if the source has no more bytes,
    /// [`DecodeError::Source`] if the fill itself fails.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError<S::Error>> {
        if self.cur == self.limit {
            self.refill()?;
        }
        let b = self.buf[self.cur];
        self.cur += 1;
        Ok(b)
    }

    /// Reads exactly `n` bytes, never fewer, spanning as many refills as it
    /// takes.
    ///
    /// The output is identical for every chunking the source chooses for its
    /// fills.
    ///
    /// # Errors
    ///
    /// [`DecodeError::EndOfStream`] if the source runs out before `n` bytes
    /// arrive, [`DecodeError::Source`] if a fill fails.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, DecodeError<S::Error>> {
        if self.available() >= n {
            let out = self.buf[self.cur..self.cur + n].to_vec();
            self.cur += n;
            return Ok(out);
        }

        let mut out = Vec::with_capacity(n);
        let mut to_go = n;
        loop {
            let avail = self.available();
            if avail >= to_go {
                out.extend_from_slice(&self.buf[self.cur..self.cur + to_go]);
                self.cur += to_go;
                return Ok(out);
            }
            out.extend_from_slice(&self.buf[self.cur..self.limit]);
            to_go -= avail;
            self.cur = self.limit;
            self.refill()?;
        }
    }

    /// Begins capturing from the current position.
    ///
    /// A later [`take_marked`](Self::take_marked) retrieves everything read
    /// between the two calls. Re-marking discards the previous capture
    /// start but not bytes already spilled to the pending accumulator, so
    /// callers should pair each `mark` with exactly one `take_marked`.
    pub fn mark(&mut self) {
        self.mark = Some(self.cur);
    }

    /// Returns every byte observed since the last [`mark`](Self::mark),
    /// minus the trailing `discard` bytes, in stream order.
    ///
    /// With `span` the total number of bytes read since the mark, the result
    /// is the first `span - discard` of them. The trim is applied to the
    /// whole span, so it is correct even when `discard` exceeds the portion
    /// of the span still resident in the current window. Afterwards the
    /// mark is unset and the pending spill is cleared.
    ///
    /// # Panics
    ///
    /// Panics if no mark is active, or if `discard` exceeds the captured
    /// span.
    pub fn take_marked(&mut self, discard: usize) -> Vec<u8> {
        let mark = self.mark.take().expect("take_marked without an active mark");
        let mut out = core::mem::take(&mut self.pending);
        out.extend_from_slice(&self.buf[mark..self.cur]);
        let span = out.len();
        assert!(
            discard <= span,
            "discard ({discard}) exceeds captured span ({span})"
        );
        out.truncate(span - discard);
        out
    }

    /// Replaces the window contents with the next chunk from the source.
    ///
    /// If a mark is active, the still-marked tail of the window is spilled
    /// into `pending` first and the mark moves to the new chunk's start.
    fn refill(&mut self) -> Result<(), DecodeError<S::Error>> {
        if let Some(mark) = self.mark {
            self.pending.extend_from_slice(&self.buf[mark..self.limit]);
            self.mark = Some(0);
        }
        let filled = self.src.fill(&mut self.buf).map_err(DecodeError::Source)?;
        trace!(filled, "buffer refilled");
        if filled == 0 {
            return Err(DecodeError::EndOfStream);
        }
        debug_assert!(filled <= self.buf.len(), "source overfilled the buffer");
        self.limit = filled;
        self.cur = 0;
        Ok(())
    }

    /// Looks up a scratch value; absent keys return `None`.
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&ScratchValue> {
        self.scratch.get(key)
    }

    /// Stores a scratch value, overwriting unconditionally.
    pub fn put(&mut self, key: u32, value: impl Into<ScratchValue>) {
        self.scratch.put(key, value);
    }

    /// Inserts `default` under `key` only if absent, then returns the
    /// current value.
    pub fn maybe_put(&mut self, key: u32, default: impl Into<ScratchValue>) -> &ScratchValue {
        self.scratch.maybe_put(key, default)
    }

    /// Clears the scratch store.
    ///
    /// The driver calls this exactly once per completed message, after the
    /// completion callback has run; decoding steps never call it.
    pub fn reset_scratch(&mut self) {
        self.scratch.reset();
    }

    /// Read-only view of the scratch store.
    #[must_use]
    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// Consumes the buffer and returns the byte source.
    pub fn into_source(self) -> S {
        self.src
    }
}

impl<S> fmt::Debug for StreamBuffer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBuffer")
            .field("capacity", &self.buf.len())
            .field("cur", &self.cur)
            .field("limit", &self.limit)
            .field("mark", &self.mark)
            .field("window", &BStr::new(&self.buf[self.cur..self.limit]))
            .field("pending", &BStr::new(&self.pending))
            .field("scratch", &self.scratch)
            .finish_non_exhaustive()
    }
}
