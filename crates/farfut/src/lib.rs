//! # Farfut
//!
//! A single-assignment completion cell for results that cross an isolation
//! boundary. The write handle travels into an isolated execution context;
//! the read handle stays with the caller and can be observed any number of
//! times, always yielding the same terminal state.
//!
//! ## Architecture
//!
//! `completion()` hands back a `(RemotePromise, RemoteFuture)` pair sharing
//! one guarded cell. The promise accepts exactly one terminal transition
//! (`Completed`, `Faulted`, or `Cancelled`); the setters consume the promise,
//! and the cell itself rejects a second write as a logic error rather than
//! ignoring it.

mod completion;
mod fault;
mod outcome;


pub use completion::{completion, Error, RemoteFuture, RemotePromise, Result};
pub use fault::Fault;
pub use outcome::Outcome;
