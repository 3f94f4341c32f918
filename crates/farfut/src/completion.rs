//! # Completion Cell
//!
//! The promise/future pair backing one remote invocation. One side crosses
//! into the isolated context and writes exactly once; the other side stays
//! with the caller and reads as often as it likes.
//!
//! ## Invariants
//!
//! - At most one terminal transition: `Pending -> {Completed | Faulted | Cancelled}`
//! - A second write attempt is rejected with `Error::AlreadyResolved`, never
//!   silently dropped
//! - A promise dropped without resolving faults the future, so the reader
//!   can never hang on an abandoned cell

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::fault::Fault;
use crate::outcome::Outcome;

/// Completion cell errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A terminal state was already written; the cell accepts exactly one.
    AlreadyResolved,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyResolved => write!(f, "completion cell already holds a terminal state"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// Message recorded when a promise is dropped without resolving.
const DROPPED_UNRESOLVED: &str = "completion source dropped before resolving";

struct Shared<T> {
    slot: Mutex<Option<Outcome<T>>>,
    notify: Notify,
}

impl<T> Shared<T> {
    /// Writes the terminal state if the cell is still pending.
    fn try_set(&self, outcome: Outcome<T>) -> Result<()> {
        {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            if slot.is_some() {
                return Err(Error::AlreadyResolved);
            }
            *slot = Some(outcome);
        }
        // Wake readers only after the lock is released.
        self.notify.notify_waiters();
        Ok(())
    }
}

/// Creates a connected promise/future pair with a pending cell.
pub fn completion<T>() -> (RemotePromise<T>, RemoteFuture<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        notify: Notify::new(),
    });
    let promise = RemotePromise { shared: shared.clone() };
    let future = RemoteFuture { shared };
    (promise, future)
}

/// Write handle for a completion cell.
///
/// Not `Clone`: there is one writer per cell, and every setter consumes the
/// promise, so a second terminal transition is unrepresentable through this
/// API. The cell still guards against a second write internally and reports
/// it as a logic error.
pub struct RemotePromise<T> {
    shared: Arc<Shared<T>>,
}

impl<T> RemotePromise<T> {
    /// Resolves the cell with a value.
    pub fn complete(self, value: T) -> Result<()> {
        self.shared.try_set(Outcome::Completed(value))
    }

    /// Resolves the cell with the full fault collection.
    pub fn fault(self, faults: Vec<Fault>) -> Result<()> {
        self.shared.try_set(Outcome::Faulted(faults))
    }

    /// Resolves the cell as cancelled.
    pub fn cancel(self) -> Result<()> {
        self.shared.try_set(Outcome::Cancelled)
    }
}

impl<T> Drop for RemotePromise<T> {
    fn drop(&mut self) {
        // Resolving consumes the promise before this runs, so the write only
        // lands when the far side abandoned the cell.
        let _ = self
            .shared
            .try_set(Outcome::Faulted(vec![Fault::new(DROPPED_UNRESOLVED)]));
    }
}

impl<T> std::fmt::Debug for RemotePromise<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemotePromise").finish_non_exhaustive()
    }
}

/// Read handle for a completion cell.
///
/// Cloneable; every clone observes the same single terminal state.
pub struct RemoteFuture<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for RemoteFuture<T> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

impl<T> RemoteFuture<T> {
    /// True once a terminal state has been written.
    pub fn is_resolved(&self) -> bool {
        self.shared
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl<T: Clone> RemoteFuture<T> {
    /// Non-blocking observation of the terminal state, if any.
    pub fn peek(&self) -> Option<Outcome<T>> {
        self.shared
            .slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Waits for the terminal state.
    ///
    /// Idempotent: calling this again after resolution returns the same
    /// outcome immediately.
    pub async fn wait(&self) -> Outcome<T> {
        loop {
            // Register for the wakeup before checking the slot, otherwise a
            // write between check and await would be missed.
            let notified = self.shared.notify.notified();
            if let Some(outcome) = self.peek() {
                return outcome;
            }
            notified.await;
        }
    }
}

impl<T> std::fmt::Debug for RemoteFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFuture")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
