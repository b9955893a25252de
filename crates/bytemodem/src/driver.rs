//! The state-machine driver that runs decoding steps against the buffer.
//!
//! A protocol is a table of numbered steps. The driver invokes the current
//! step, follows the [`Transition`] it returns, and fires the completion
//! callback whenever a step signals that a whole message has been decoded.
//! Decoding then restarts from the entry state (the lowest registered id)
//! for the next message.
//!
//! The table is built explicitly and validated eagerly: duplicate ids are
//! caught at registration, and handler shape is enforced by the type system
//! rather than checked at dispatch time.

use alloc::{boxed::Box, collections::BTreeMap, rc::Rc};
use core::cell::Cell;

use tracing::trace;

use crate::{
    buffer::StreamBuffer,
    error::{ConfigError, DecodeError, StepError},
    source::ByteSource,
};

/// Identifier of one decoding step in the state table.
pub type StateId = u32;

/// What a decoding step tells the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Continue with the step registered under this id.
    Goto(StateId),
    /// The message is fully decoded; fire the completion callback and
    /// restart from the entry state.
    Complete,
}

/// A single decoding step: consumes bytes from the buffer, communicates
/// decoded sub-values through its scratch store, and names the next step.
pub type StateFn<S> =
    Box<dyn FnMut(&mut StreamBuffer<S>) -> Result<Transition, DecodeError<<S as ByteSource>::Error>>>;

/// The id → step table a protocol author builds before constructing a
/// driver.
pub struct StateTable<S: ByteSource> {
    states: BTreeMap<StateId, StateFn<S>>,
}

impl<S: ByteSource> StateTable<S> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    /// Registers `handler` under `id`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateState`] if `id` is already taken.
    pub fn register<F>(&mut self, id: StateId, handler: F) -> Result<(), ConfigError>
    where
        F: FnMut(&mut StreamBuffer<S>) -> Result<Transition, DecodeError<S::Error>> + 'static,
    {
        if self.states.contains_key(&id) {
            return Err(ConfigError::DuplicateState(id));
        }
        self.states.insert(id, Box::new(handler));
        Ok(())
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// `true` if no steps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: ByteSource> Default for StateTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative termination flag for a [`ProtocolDriver`].
///
/// Cloneable, so a completion callback (or any other same-thread owner) can
/// keep a handle and request termination from inside the run loop. A request
/// takes effect only at the next message boundary: the in-flight message
/// always finishes decoding first.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Rc<Cell<bool>>,
}

impl StopHandle {
    /// Creates a handle with the flag unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the driver stop after the current message completes.
    pub fn terminate(&self) {
        self.flag.set(true);
    }

    /// `true` once termination has been requested.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.flag.get()
    }
}

/// Runs a registered table of decoding steps over a [`StreamBuffer`].
///
/// Constructed once per stream session and driven via [`run`](Self::run)
/// until termination is requested or an error propagates.
pub struct ProtocolDriver<S: ByteSource, F> {
    buffer: StreamBuffer<S>,
    states: BTreeMap<StateId, StateFn<S>>,
    entry: StateId,
    current: StateId,
    stop: StopHandle,
    on_message: F,
}

impl<S, F> ProtocolDriver<S, F>
where
    S: ByteSource,
    F: FnMut(&mut StreamBuffer<S>) -> Result<(), StepError>,
{
    /// Builds a driver from a buffer, a validated state table, a stop handle
    /// and a completion callback.
    ///
    /// The entry state is the lowest registered id. The stop handle is
    /// supplied by the caller so that `on_message` (constructed before the
    /// driver exists) can capture a clone of it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoStates`] if the table is empty, in which case no
    /// entry state exists.
    pub fn new(
        buffer: StreamBuffer<S>,
        table: StateTable<S>,
        stop: StopHandle,
        on_message: F,
    ) -> Result<Self, ConfigError> {
        let entry = table
            .states
            .keys()
            .next()
            .copied()
            .ok_or(ConfigError::NoStates)?;
        Ok(Self {
            buffer,
            states: table.states,
            entry,
            current: entry,
            stop,
            on_message,
        })
    }

    /// Id of the step that will execute next.
    #[must_use]
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// A clone of the driver's stop handle.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs the decode loop.
    ///
    /// Each iteration dispatches the current step and follows its
    /// transition. On [`Transition::Complete`] the completion callback runs,
    /// the scratch store is cleared, the current state resets to the entry
    /// state, and only then is the stop flag checked; a termination request
    /// therefore never interrupts a message mid-decode. Returns `Ok(())`
    /// when termination was requested.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnknownState`] if a step names an unregistered id;
    /// any error raised by a step, the completion callback, or the byte
    /// source. All are fatal to this call: the driver performs no retry and
    /// no partial-message recovery.
    pub fn run(&mut self) -> Result<(), DecodeError<S::Error>> {
        loop {
            let handler = self
                .states
                .get_mut(&self.current)
                .ok_or(DecodeError::UnknownState(self.current))?;
            trace!(state = self.current, "dispatching step");
            match handler(&mut self.buffer)? {
                Transition::Goto(next) => self.current = next,
                Transition::Complete => {
                    trace!("message complete");
                    (self.on_message)(&mut self.buffer).map_err(DecodeError::Completion)?;
                    self.buffer.reset_scratch();
                    self.current = self.entry;
                    if self.stop.is_terminated() {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Consumes the driver and returns its buffer.
    pub fn into_buffer(self) -> StreamBuffer<S> {
        self.buffer
    }
}
