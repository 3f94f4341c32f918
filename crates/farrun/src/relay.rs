//! # Completion Relay
//!
//! The continuation that watches one operation task and writes its terminal
//! state into the promise. Cancelled, faulted, completed: checked in that
//! order, mutually exclusive, exhaustive. The relay never re-runs the
//! operation; a failure is reported, not retried.

use farfut::Fault;
use farfut::Outcome;
use farfut::RemotePromise;
use tokio::task::JoinHandle;

/// Spawns the relay task for one operation.
pub(crate) fn attach<T>(task: JoinHandle<Outcome<T>>, promise: RemotePromise<T>)
where
    T: Send + 'static,
{
    tokio::spawn(async move {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            // The task was torn out from under the operation.
            Err(err) if err.is_cancelled() => Outcome::Cancelled,
            // The operation panicked; the payload becomes the fault.
            Err(err) => Outcome::Faulted(vec![Fault::from_panic(err.into_panic())]),
        };

        let write = match outcome {
            Outcome::Cancelled => promise.cancel(),
            Outcome::Faulted(faults) => promise.fault(faults),
            Outcome::Completed(value) => promise.complete(value),
        };

        // Unreachable through the public API; the relay is the only writer.
        if let Err(e) = write {
            tracing::warn!("relay could not record terminal state: {}", e);
        }
    });
}
