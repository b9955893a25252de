use alloc::boxed::Box;

use thiserror::Error;

use crate::driver::StateId;

/// Boxed error raised by a decoding step or a completion callback.
///
/// The engine never inspects these; they propagate out of
/// [`ProtocolDriver::run`](crate::ProtocolDriver::run) unmodified.
pub type StepError = Box<dyn core::error::Error + Send + Sync>;

/// Configuration errors, detected while the state table is being built.
///
/// These are fatal to configuration and never retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Two handlers were registered under the same state id.
    #[error("state {0} is already registered")]
    DuplicateState(StateId),
    /// The state table is empty, so no entry state exists.
    #[error("no states registered")]
    NoStates,
}

/// Errors surfaced while decoding, generic over the byte source's own error
/// type.
#[derive(Debug, Error)]
pub enum DecodeError<E> {
    /// The byte source reported end of input while a read still needed bytes.
    #[error("end of stream")]
    EndOfStream,
    /// The byte source failed to fill the buffer.
    #[error("byte source failed: {0}")]
    Source(E),
    /// A handler returned a state id with no registered handler.
    #[error("no state registered for id {0}")]
    UnknownState(StateId),
    /// A decoding step raised an error of its own.
    #[error("decoding step failed: {0}")]
    Step(StepError),
    /// The completion callback raised an error.
    #[error("completion callback failed: {0}")]
    Completion(StepError),
}

impl<E> DecodeError<E> {
    /// Wraps an arbitrary error raised inside a decoding step.
    pub fn step<T>(err: T) -> Self
    where
        T: core::error::Error + Send + Sync + 'static,
    {
        Self::Step(Box::new(err))
    }
}
