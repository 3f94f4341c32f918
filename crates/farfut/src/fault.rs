//! # Fault Records
//!
//! Errors that cross an isolation boundary are carried as plain records, not
//! live error objects. Whatever failed on the far side is reduced to a
//! message here so the record stays `Clone + Send` and can be observed by
//! any number of readers.

use std::any::Any;

/// A single boundary-safe error record.
///
/// Faulted outcomes carry a `Vec<Fault>` rather than a single fault, so a
/// far-side failure with several underlying errors reaches the caller with
/// the full collection intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    message: String,
}

impl Fault {
    /// Creates a fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Creates a fault from a panic payload.
    ///
    /// Panic payloads are almost always `&str` or `String`; anything else
    /// is recorded as an opaque panic.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        Self { message }
    }

    /// The fault message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Fault {}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
