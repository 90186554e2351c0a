//! # Scheduling adapters.
//!
//! A scheduling adapter takes a dispatch [`Thunk`] produced on a worker and arranges
//! for it to run in some target context ("the UI thread", "the event-loop task").
//! The threaded receive loop relies on it so listeners never run on the worker.
//!
//! ```text
//!  worker thread                         target context
//!  ─────────────                         ──────────────
//!  channel.get() ──► Entry
//!        └──► adapter.schedule(thunk) ──► thunk() ──► listeners
//! ```
//!
//! Provided adapters:
//! - any `Fn(Thunk) + Send + Sync` closure;
//! - [`MarshalHandle`], feeding a [`Marshal`] queue drained by a designated thread;
//! - [`TokioHandoff`], feeding a tokio task through an unbounded mpsc channel.

mod marshal;

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::DispatchError;

pub use marshal::{Marshal, MarshalHandle};

/// One deferred dispatch.
///
/// Running it invokes the listeners for one entry and returns their outcome,
/// so a listener failure surfaces in the target context.
pub type Thunk = Box<dyn FnOnce() -> Result<(), DispatchError> + Send + 'static>;

/// Relocates a [`Thunk`] onto a target execution context.
///
/// ### Implementation requirements
/// - Must eventually run each thunk exactly once; a dropped thunk stalls that event.
/// - Must preserve the order in which thunks were scheduled.
/// - Should not run thunks concurrently with each other.
pub trait Schedule: Send + Sync {
    /// Arranges for `thunk` to run in the target context.
    fn schedule(&self, thunk: Thunk);
}

impl<F> Schedule for F
where
    F: Fn(Thunk) + Send + Sync,
{
    fn schedule(&self, thunk: Thunk) {
        self(thunk)
    }
}

/// Adapter that hands thunks to a tokio task.
///
/// The receiving task runs them in arrival order, typically on a current-thread runtime
/// or inside a `LocalSet`, which keeps every listener on that one task.
///
/// ## Example
/// ```rust,no_run
/// use sigdispatch::{Dispatcher, TokioHandoff};
///
/// # async fn run() -> Result<(), sigdispatch::DispatchError> {
/// let Dispatcher { sender, mut receiver } = Dispatcher::new();
/// receiver.connect("tick", |_args| Ok(()));
///
/// let (handoff, mut thunks) = TokioHandoff::channel();
/// let done = receiver.threaded_handle_until_closed(handoff, None)?;
///
/// sender.fire("tick", ())?;
/// sender.close()?;
/// while let Some(thunk) = thunks.recv().await {
///     thunk()?;
/// }
/// done.await??;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TokioHandoff {
    tx: mpsc::UnboundedSender<Thunk>,
}

impl TokioHandoff {
    /// Creates the adapter and the receiving end the target task drains.
    ///
    /// The receiving end yields `None` once every adapter clone is dropped,
    /// which happens when the threaded loop that owns the adapter exits.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Thunk>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Schedule for TokioHandoff {
    fn schedule(&self, thunk: Thunk) {
        if self.tx.send(thunk).is_err() {
            warn!("handoff target is gone; dispatch dropped");
        }
    }
}
