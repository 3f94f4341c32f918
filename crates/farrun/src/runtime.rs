//! # Runtime Registry
//!
//! Central registry of live isolates. Uses DashMap for concurrent access
//! without global locking, so tasks can spawn isolates and dispatch into
//! them simultaneously. The runtime also owns the proxy factory used for
//! dispatch, which keeps the delivery mechanism swappable in one place.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use farfut::RemoteFuture;

use crate::args::AsyncCall;
use crate::args::CallArgs;
use crate::invoke;
use crate::isolate;
use crate::isolate::Isolate;
use crate::isolate::IsolateHandle;
use crate::proxy::MailboxFactory;
use crate::proxy::ProxyFactory;

/// Strong type for isolate identifiers.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct IsolateId(pub u64);

impl std::fmt::Display for IsolateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "isolate-{}", self.0)
    }
}

#[derive(Debug)]
pub enum Error {
    IsolateNotFound(IsolateId),
    Spawn(isolate::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IsolateNotFound(id) => write!(f, "Isolate not found: {}", id),
            Self::Spawn(e) => write!(f, "Spawn error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<isolate::Error> for Error {
    fn from(e: isolate::Error) -> Self {
        Self::Spawn(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Registry of isolated contexts plus the dispatch front door.
pub struct Runtime {
    isolates: DashMap<IsolateId, Isolate>,
    next_isolate_id: AtomicU64,
    factory: Box<dyn ProxyFactory>,
}

impl Runtime {
    /// Creates a runtime dispatching through in-process mailbox proxies.
    pub fn new() -> Self {
        Self::with_factory(Box::new(MailboxFactory))
    }

    /// Creates a runtime with a custom proxy factory.
    pub fn with_factory(factory: Box<dyn ProxyFactory>) -> Self {
        Self {
            isolates: DashMap::new(),
            next_isolate_id: AtomicU64::new(1),
            factory,
        }
    }

    /// Spawns a new isolate and registers it.
    pub fn spawn_isolate(&self, name: impl Into<String>) -> Result<IsolateId> {
        let id = IsolateId(self.next_isolate_id.fetch_add(1, Ordering::Relaxed));
        let isolate = Isolate::spawn(name)?;
        tracing::debug!(%id, name = %isolate.name(), "isolate registered");
        self.isolates.insert(id, isolate);
        Ok(id)
    }

    /// A handle into the given isolate, if it is still registered.
    pub fn handle(&self, id: IsolateId) -> Option<IsolateHandle> {
        self.isolates.get(&id).map(|entry| entry.handle())
    }

    /// Unregisters the isolate, stops its pump, and joins its thread.
    ///
    /// Blocks until the pump thread has exited; from async code, call
    /// through `tokio::task::spawn_blocking` if the isolate may be busy.
    pub fn shutdown(&self, id: IsolateId) -> Result<()> {
        let (_, isolate) = self
            .isolates
            .remove(&id)
            .ok_or(Error::IsolateNotFound(id))?;
        isolate.shutdown();
        tracing::debug!(%id, "isolate shut down");
        Ok(())
    }

    /// Dispatches a deferred operation into the isolate with the given id.
    ///
    /// An unknown id is an absent context: the call fails with
    /// `InvalidArgument` before any crossing.
    pub async fn invoke<A, F>(
        &self,
        id: IsolateId,
        args: A,
        operation: F,
    ) -> invoke::Result<RemoteFuture<F::Output>>
    where
        A: CallArgs,
        F: AsyncCall<A>,
    {
        let Some(handle) = self.handle(id) else {
            return Err(invoke::Error::InvalidArgument("unknown isolate id"));
        };
        invoke::invoke(self.factory.as_ref(), &handle, args, operation).await
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
