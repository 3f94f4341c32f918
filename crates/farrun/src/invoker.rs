//! Per-call executor living inside the isolated context.

use farfut::RemotePromise;

use crate::args::AsyncCall;
use crate::args::CallArgs;
use crate::relay;

/// Holds exactly one call's parameters and its promise; created by the
/// dispatcher, executed once on the isolate's runtime, then discarded.
pub(crate) struct Invoker<A, F>
where
    A: CallArgs,
    F: AsyncCall<A>,
{
    args: A,
    operation: F,
    promise: RemotePromise<F::Output>,
}

impl<A, F> Invoker<A, F>
where
    A: CallArgs,
    F: AsyncCall<A>,
{
    pub(crate) fn new(args: A, operation: F, promise: RemotePromise<F::Output>) -> Self {
        Self {
            args,
            operation,
            promise,
        }
    }

    /// Starts the operation as its own task and attaches the relay.
    ///
    /// Returns immediately; the operation's latency is absorbed by the
    /// promise, never by the crossing call. The operation runs entirely
    /// inside the spawned task, so even a panic before its future is built
    /// lands in the relay as a fault instead of killing the pump.
    pub(crate) fn run(self) {
        let Self {
            args,
            operation,
            promise,
        } = self;

        let task = tokio::spawn(async move { operation.call(args).await });
        relay::attach(task, promise);
    }
}
