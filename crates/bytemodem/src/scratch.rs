//! Per-message keyed storage shared by the decoding steps of one message.
//!
//! Each slot holds a [`ScratchValue`] tagged union and the typed accessors
//! return `Option`, so a lookup can never silently misinterpret a value's
//! shape.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

use bstr::BStr;

/// A single value stored in the scratch store.
#[derive(Clone, PartialEq, Eq)]
pub enum ScratchValue {
    /// An unsigned integer, e.g. a decoded length prefix.
    U64(u64),
    /// A raw byte payload.
    Bytes(Vec<u8>),
    /// A decoded text payload.
    Text(String),
}

impl ScratchValue {
    /// Returns the integer value, or `None` if this slot holds another shape.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the byte payload, or `None` if this slot holds another shape.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the text payload, or `None` if this slot holds another shape.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for ScratchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64(v) => f.debug_tuple("U64").field(v).finish(),
            // Byte payloads are usually mostly text; print them legibly.
            Self::Bytes(v) => f.debug_tuple("Bytes").field(&BStr::new(v)).finish(),
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
        }
    }
}

impl From<u64> for ScratchValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<Vec<u8>> for ScratchValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for ScratchValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.into())
    }
}

impl From<String> for ScratchValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for ScratchValue {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

/// Keyed store of [`ScratchValue`]s, valid for exactly one decode iteration.
///
/// Owned by the buffer; cleared by the driver after each completed message,
/// never by the decoding steps themselves.
#[derive(Debug, Default)]
pub struct Scratch {
    slots: BTreeMap<u32, ScratchValue>,
}

impl Scratch {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`; absent keys return `None`.
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&ScratchValue> {
        self.slots.get(&key)
    }

    /// Stores `value` under `key`, overwriting unconditionally.
    pub fn put(&mut self, key: u32, value: impl Into<ScratchValue>) {
        self.slots.insert(key, value.into());
    }

    /// Inserts `default` only if `key` is absent, then returns the current
    /// value.
    pub fn maybe_put(&mut self, key: u32, default: impl Into<ScratchValue>) -> &ScratchValue {
        self.slots.entry(key).or_insert_with(|| default.into())
    }

    /// Removes all keys.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// `true` if no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
