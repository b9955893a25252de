//! The pull interface the buffer refills itself from, plus the stock
//! adapters.
//!
//! A [`ByteSource`] has one job: given a destination region, write some bytes
//! into it and say how many. Returning `Ok(0)` means the source has nothing
//! further to offer; the buffer surfaces that as
//! [`DecodeError::EndOfStream`](crate::DecodeError::EndOfStream) rather than
//! calling `fill` again in a loop.

use core::convert::Infallible;

/// A pull-based supplier of raw bytes.
///
/// Implementations may block inside [`fill`](Self::fill) for as long as their
/// own contract allows; the decoding core imposes no timeout of its own.
pub trait ByteSource {
    /// Error raised when the source cannot be read at all. Distinct from end
    /// of input, which is signalled by `Ok(0)`.
    type Error;

    /// Writes available bytes into `dest`, returning how many were written.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying channel; it propagates out of the
    /// decoding core unmodified.
    fn fill(&mut self, dest: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    type Error = S::Error;

    fn fill(&mut self, dest: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).fill(dest)
    }
}

/// An in-memory source over a byte slice.
///
/// Each `fill` hands out as much of the remainder as fits in the
/// destination. Mostly useful for tests and for decoding data that is
/// already resident.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source that yields `data` from the beginning.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    type Error = Infallible;

    fn fill(&mut self, dest: &mut [u8]) -> Result<usize, Self::Error> {
        let n = dest.len().min(self.remaining());
        dest[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Adapter wrapping any [`std::io::Read`] as a byte source.
///
/// `Interrupted` reads are retried; everything else propagates. A read of
/// zero bytes is end of input, matching the [`ByteSource`] contract.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> ReaderSource<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> ByteSource for ReaderSource<R> {
    type Error = std::io::Error;

    fn fill(&mut self, dest: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.inner.read(dest) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteSource, SliceSource};

    #[test]
    fn slice_source_drains_in_dest_sized_steps() {
        let mut src = SliceSource::new(b"abcdefgh");
        let mut dest = [0u8; 3];
        assert_eq!(src.fill(&mut dest).unwrap(), 3);
        assert_eq!(&dest, b"abc");
        assert_eq!(src.fill(&mut dest).unwrap(), 3);
        assert_eq!(&dest, b"def");
        assert_eq!(src.fill(&mut dest).unwrap(), 2);
        assert_eq!(&dest[..2], b"gh");
        assert_eq!(src.fill(&mut dest).unwrap(), 0);
        assert_eq!(src.remaining(), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn reader_source_reports_zero_at_eof() {
        use super::ReaderSource;

        let mut src = ReaderSource::new(std::io::Cursor::new(b"xy".to_vec()));
        let mut dest = [0u8; 8];
        assert_eq!(src.fill(&mut dest).unwrap(), 2);
        assert_eq!(src.fill(&mut dest).unwrap(), 0);
    }
}
