//! An incremental, pull-based decoder for framed byte streams.
//!
//! `bytemodem` decodes variable-length, framed messages out of a continuous
//! byte stream without ever holding a whole message in memory. A protocol is
//! expressed as a small set of numbered decoding steps over a shared
//! [`StreamBuffer`]; the [`ProtocolDriver`] dispatches those steps, and a
//! completion callback fires once per fully decoded message.
//!
//! The crate does no I/O of its own: bytes are pulled through the
//! [`ByteSource`] trait, one fixed-size chunk at a time. [`SliceSource`]
//! decodes in-memory data; with the default `std` feature, [`ReaderSource`]
//! wraps any [`std::io::Read`].
//!
//! ```
//! use bytemodem::{
//!     ProtocolDriver, SliceSource, StateTable, StopHandle, StreamBuffer, Transition,
//! };
//!
//! // One-state protocol: lines terminated by b'\n'.
//! const LINE: u32 = 0;
//!
//! let mut table: StateTable<SliceSource<'static>> = StateTable::new();
//! table.register(0, |buf| {
//!     buf.mark();
//!     while buf.read_byte()? != b'\n' {}
//!     let line = buf.take_marked(1);
//!     buf.put(LINE, line);
//!     Ok(Transition::Complete)
//! })?;
//!
//! let stop = StopHandle::new();
//! let handle = stop.clone();
//! let buffer = StreamBuffer::new(4, SliceSource::new(b"first\nsecond\n"));
//! let mut lines = Vec::new();
//! let mut driver = ProtocolDriver::new(buffer, table, stop, move |buf| {
//!     lines.push(buf.get(LINE).and_then(|v| v.as_bytes()).unwrap().to_vec());
//!     if lines.len() == 2 {
//!         handle.terminate();
//!     }
//!     Ok(())
//! })?;
//!
//! driver.run()?;
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod buffer;
mod driver;
mod error;
mod scratch;
mod source;

#[cfg(test)]
mod tests;

pub use buffer::StreamBuffer;
pub use driver::{ProtocolDriver, StateFn, StateId, StateTable, StopHandle, Transition};
pub use error::{ConfigError, DecodeError, StepError};
pub use scratch::{Scratch, ScratchValue};
#[cfg(feature = "std")]
pub use source::ReaderSource;
pub use source::{ByteSource, SliceSource};
