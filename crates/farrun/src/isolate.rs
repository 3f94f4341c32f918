//! # Isolated Execution Context
//!
//! An isolate is a dedicated OS thread running its own single-threaded tokio
//! runtime and a mailbox pump. Everything executed "inside" the context runs
//! on that runtime, and the only way in is a message through the mailbox, so
//! the crossing point is explicit.
//!
//! ## Invariants
//!
//! - The pump executes envelopes in arrival order and acknowledges each one
//!   after its relay is attached, never after the operation finishes
//! - Envelopes queued behind a shutdown are dropped; their acknowledgement
//!   channels close, which the dispatcher reports as a boundary failure

use std::thread;

use tokio::sync::mpsc;
use tokio::sync::oneshot;

/// Isolate errors.
#[derive(Debug)]
pub enum Error {
    /// The backing thread or runtime could not be created.
    Spawn(std::io::Error),
    /// The pump is gone; the mailbox no longer accepts envelopes.
    MailboxClosed,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "Failed to spawn isolate: {}", e),
            Self::MailboxClosed => write!(f, "Isolate mailbox is closed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            Self::MailboxClosed => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) type Job = Box<dyn FnOnce() + Send>;

/// One invocation crossing the boundary: a type-erased job plus the channel
/// acknowledging that its relay has been attached.
pub struct Envelope {
    job: Job,
    ack: oneshot::Sender<()>,
}

impl Envelope {
    pub(crate) fn new(job: Job, ack: oneshot::Sender<()>) -> Self {
        Self { job, ack }
    }

    /// Runs the job on the current runtime and fires the acknowledgement.
    ///
    /// Context implementations driving envelopes themselves must call this
    /// from within a tokio runtime, since the job spawns tasks.
    pub fn execute(self) {
        (self.job)();
        // The dispatcher may have given up already; that is its business.
        let _ = self.ack.send(());
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope").finish_non_exhaustive()
    }
}

pub(crate) enum Message {
    Invoke(Envelope),
    Shutdown,
}

/// Cloneable, reference-marshaled handle to an isolate's mailbox.
#[derive(Clone)]
pub struct IsolateHandle {
    name: std::sync::Arc<str>,
    tx: mpsc::UnboundedSender<Message>,
}

impl IsolateHandle {
    /// The isolate's name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the context behind this handle can still be reached.
    pub fn is_attached(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Hands an envelope to the mailbox. Fails if the pump is gone.
    pub(crate) fn deliver(&self, envelope: Envelope) -> Result<()> {
        self.tx
            .send(Message::Invoke(envelope))
            .map_err(|_| Error::MailboxClosed)
    }

    fn send_shutdown(&self) {
        let _ = self.tx.send(Message::Shutdown);
    }
}

impl std::fmt::Debug for IsolateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsolateHandle")
            .field("name", &self.name)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// A running isolated execution context.
///
/// Owns the pump thread; dropping the `Isolate` without calling `shutdown`
/// leaves the thread running until every handle is gone.
pub struct Isolate {
    handle: IsolateHandle,
    thread: thread::JoinHandle<()>,
}

impl Isolate {
    /// Spawns a new context: a thread with its own current-thread runtime
    /// driving the mailbox pump.
    pub fn spawn(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel();

        // Build the runtime here so the failure surfaces to the caller
        // instead of dying inside the new thread.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Spawn)?;

        let handle = IsolateHandle {
            name: name.clone().into(),
            tx,
        };

        let pump_name = name.clone();
        let thread = thread::Builder::new()
            .name(format!("isolate-{}", name))
            .spawn(move || runtime.block_on(pump(pump_name, rx)))
            .map_err(Error::Spawn)?;

        Ok(Self { handle, thread })
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// A fresh handle into this context.
    pub fn handle(&self) -> IsolateHandle {
        self.handle.clone()
    }

    /// Stops the pump and joins the thread.
    ///
    /// Queued envelopes are dropped and in-flight operations die with the
    /// runtime; their futures fault rather than hang.
    ///
    /// Blocks the calling thread until the pump thread has exited; from
    /// async code, call through `tokio::task::spawn_blocking`.
    pub fn shutdown(self) {
        self.handle.send_shutdown();
        let _ = self.thread.join();
    }
}

impl std::fmt::Debug for Isolate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Isolate")
            .field("name", &self.handle.name)
            .finish()
    }
}

/// Drains the mailbox until shutdown or until every handle is dropped.
async fn pump(name: String, mut rx: mpsc::UnboundedReceiver<Message>) {
    tracing::debug!(isolate = %name, "pump started");
    while let Some(msg) = rx.recv().await {
        match msg {
            Message::Invoke(envelope) => {
                tracing::trace!(isolate = %name, "executing envelope");
                envelope.execute();
            }
            Message::Shutdown => break,
        }
    }
    tracing::debug!(isolate = %name, "pump stopped");
    // rx drops here; anything still queued loses its ack channel.
}
