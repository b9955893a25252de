//! Shared helpers for the scenario and property tests.

use alloc::{vec, vec::Vec};
use core::{convert::Infallible, fmt};

use crate::ByteSource;

/// A source that owns its data and doles it out in scripted chunk sizes.
///
/// Each fill consumes the next entry of `sizes` (cycling, minimum one byte);
/// with no script it fills as much as the destination holds. This lets
/// tests pick arbitrary partitions of the same payload.
pub(crate) struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    sizes: Vec<usize>,
    next: usize,
}

impl ChunkedSource {
    pub(crate) fn fixed(data: Vec<u8>, chunk: usize) -> Self {
        Self::scripted(data, vec![chunk])
    }

    pub(crate) fn scripted(data: Vec<u8>, sizes: Vec<usize>) -> Self {
        Self {
            data,
            pos: 0,
            sizes,
            next: 0,
        }
    }
}

impl ByteSource for ChunkedSource {
    type Error = Infallible;

    fn fill(&mut self, dest: &mut [u8]) -> Result<usize, Self::Error> {
        let chunk = if self.sizes.is_empty() {
            dest.len()
        } else {
            let c = self.sizes[self.next % self.sizes.len()].max(1);
            self.next += 1;
            c
        };
        let n = chunk.min(dest.len()).min(self.data.len() - self.pos);
        dest[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// A source whose every fill fails.
#[derive(Debug)]
pub(crate) struct BrokenSource;

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Broken;

impl fmt::Display for Broken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("broken pipe")
    }
}

impl core::error::Error for Broken {}

impl ByteSource for BrokenSource {
    type Error = Broken;

    fn fill(&mut self, _dest: &mut [u8]) -> Result<usize, Self::Error> {
        Err(Broken)
    }
}

/// Encodes `n` as big-endian base-128 digits with the high bit clear.
///
/// The length decoder in the framed-stream tests accumulates these digits
/// and stops at the first byte with the high bit set, so a frame follows
/// the digits with a `0x80` terminator.
pub(crate) fn length_digits(mut n: usize) -> Vec<u8> {
    let mut digits = vec![(n & 0x7f) as u8];
    n >>= 7;
    while n > 0 {
        digits.push((n & 0x7f) as u8);
        n >>= 7;
    }
    digits.reverse();
    digits
}

/// Builds one frame: start token, binary length, `0x80` terminator, binary
/// payload, text payload, `0xFF` end-of-message.
pub(crate) fn frame(binary: &[u8], text: &str) -> Vec<u8> {
    let mut out = vec![0x80];
    out.extend_from_slice(&length_digits(binary.len()));
    out.push(0x80);
    out.extend_from_slice(binary);
    out.extend_from_slice(text.as_bytes());
    out.push(0xFF);
    out
}
