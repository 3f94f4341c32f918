//! # Invocation Proxy
//!
//! The explicit crossing point into an isolated context, modeled as a
//! message send rather than transparent reference semantics. The factory
//! seam exists so the delivery mechanism can be replaced wholesale; the
//! dispatcher only ever sees `Box<dyn InvokerProxy>`.

use async_trait::async_trait;

use crate::isolate::Envelope;
use crate::isolate::IsolateHandle;

/// Crossing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The context's mailbox is closed; nothing can cross.
    ContextUnreachable,
    /// The context accepted the envelope but discarded it before the relay
    /// was attached (shutdown racing the call).
    AckDropped,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContextUnreachable => write!(f, "isolate mailbox is closed"),
            Self::AckDropped => {
                write!(f, "isolate discarded the call before attaching the relay")
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A callable handle located at the boundary of one context.
///
/// Object-safe (`Box<dyn InvokerProxy>`); delivery is the only operation.
#[async_trait]
pub trait InvokerProxy: Send + Sync {
    /// Moves one envelope into the context.
    ///
    /// Returns once the envelope is in the context's hands; relay attachment
    /// is acknowledged separately through the envelope's own channel.
    async fn deliver(&self, envelope: Envelope) -> Result<()>;
}

/// Produces proxies into isolated contexts.
pub trait ProxyFactory: Send + Sync {
    /// Creates a proxy bound to the given context.
    ///
    /// Fails with `ContextUnreachable` if the handle is already detached.
    fn create_proxy(&self, context: &IsolateHandle) -> Result<Box<dyn InvokerProxy>>;
}

/// In-process delivery straight into the isolate's mailbox.
pub struct MailboxProxy {
    handle: IsolateHandle,
}

#[async_trait]
impl InvokerProxy for MailboxProxy {
    async fn deliver(&self, envelope: Envelope) -> Result<()> {
        self.handle
            .deliver(envelope)
            .map_err(|_| Error::ContextUnreachable)
    }
}

/// The default factory: mailbox proxies for in-process isolates.
pub struct MailboxFactory;

impl ProxyFactory for MailboxFactory {
    fn create_proxy(&self, context: &IsolateHandle) -> Result<Box<dyn InvokerProxy>> {
        if !context.is_attached() {
            return Err(Error::ContextUnreachable);
        }
        Ok(Box::new(MailboxProxy {
            handle: context.clone(),
        }))
    }
}
