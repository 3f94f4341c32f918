//! # Invocation Dispatcher
//!
//! The single generic entry point for dispatching a deferred operation into
//! an isolated context. Validates its inputs before any crossing, obtains a
//! proxy from the factory, wires up the completion cell, and hands the call
//! across. The caller gets the read side of the cell back as soon as the
//! context acknowledges that the relay is attached.

use farfut::completion;
use farfut::RemoteFuture;
use tokio::sync::oneshot;

use crate::args::AsyncCall;
use crate::args::CallArgs;
use crate::invoker::Invoker;
use crate::isolate::Envelope;
use crate::isolate::IsolateHandle;
use crate::proxy;
use crate::proxy::ProxyFactory;

/// Dispatch errors.
///
/// Operation faults and cancellations are not errors of the dispatch itself;
/// they surface later through the returned future's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required input was absent or unusable; reported synchronously,
    /// before any crossing is attempted.
    InvalidArgument(&'static str),
    /// The crossing failed, or the context dropped the call before the relay
    /// was attached.
    Boundary(proxy::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(what) => write!(f, "Invalid argument: {}", what),
            Self::Boundary(e) => write!(f, "Boundary failure: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boundary(e) => Some(e),
            _ => None,
        }
    }
}

impl From<proxy::Error> for Error {
    fn from(e: proxy::Error) -> Self {
        Self::Boundary(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Dispatches `operation` with `args` into the context behind `context`.
///
/// Blocks only until the context acknowledges relay attachment; the
/// operation's own latency is absorbed entirely by the returned future,
/// which resolves to exactly one of completed, faulted, or cancelled.
///
/// A detached context handle fails with `InvalidArgument` before anything
/// crosses. Factory failures propagate unchanged. A far-side failure before
/// relay attachment fails this call rather than leaving the future pending.
pub async fn invoke<A, F>(
    factory: &dyn ProxyFactory,
    context: &IsolateHandle,
    args: A,
    operation: F,
) -> Result<RemoteFuture<F::Output>>
where
    A: CallArgs,
    F: AsyncCall<A>,
{
    if !context.is_attached() {
        return Err(Error::InvalidArgument("context handle is detached"));
    }

    let proxy = factory.create_proxy(context)?;
    let (promise, future) = completion();

    let invoker = Invoker::new(args, operation, promise);
    let (ack_tx, ack_rx) = oneshot::channel();
    let envelope = Envelope::new(Box::new(move || invoker.run()), ack_tx);

    tracing::trace!(context = %context.name(), "dispatching deferred operation");
    proxy.deliver(envelope).await?;

    match ack_rx.await {
        Ok(()) => Ok(future),
        Err(_) => Err(Error::Boundary(proxy::Error::AckDropped)),
    }
}
