//! # Terminal Outcomes
//!
//! The exhaustive set of terminal states for a deferred operation. There is
//! no fourth state: an operation either produced a value, failed with one or
//! more faults, or was cancelled.

use crate::fault::Fault;

/// The terminal state of a deferred operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation produced a value.
    Completed(T),
    /// The operation failed; every underlying fault is preserved.
    Faulted(Vec<Fault>),
    /// The operation was cancelled before producing a value.
    Cancelled,
}

impl<T> Outcome<T> {
    /// Shorthand for a single-fault failure.
    pub fn fault(fault: impl Into<Fault>) -> Self {
        Self::Faulted(vec![fault.into()])
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// The fault collection, if the operation faulted.
    pub fn faults(&self) -> Option<&[Fault]> {
        match self {
            Self::Faulted(faults) => Some(faults),
            _ => None,
        }
    }
}

impl<T, E: Into<Fault>> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(e) => Self::Faulted(vec![e.into()]),
        }
    }
}
