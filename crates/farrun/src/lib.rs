//! # Farrun
//!
//! Dispatches deferred asynchronous operations into isolated execution
//! contexts and relays their terminal state back to the caller as a
//! `farfut::RemoteFuture`.
//!
//! ## Architecture
//!
//! - `isolate`: the execution context itself, a dedicated thread with its own
//!   runtime, reachable only through a mailbox
//! - `proxy`: the explicit crossing point into a context, behind a factory
//!   seam so the delivery mechanism can be swapped
//! - `invoke`: the dispatcher, one generic entry point over call arities 0-5
//! - `runtime`: a concurrent registry of isolates with an invocation front
//!   door
//!
//! The invoker and relay run inside the context: the invoker starts the
//! operation as a task and returns as soon as the relay is attached; the
//! relay alone writes the operation's terminal state into the future.

pub mod args;
pub mod invoke;
pub mod isolate;
pub mod proxy;
pub mod runtime;

mod invoker;
mod relay;


pub use args::{AsyncCall, CallArgs};
pub use farfut::{Fault, Outcome, RemoteFuture};
pub use invoke::invoke;
pub use isolate::{Isolate, IsolateHandle};
pub use runtime::{IsolateId, Runtime};
