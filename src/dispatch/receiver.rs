//! # Receiving end of a dispatcher.
//!
//! [`Receiver`] owns the listener registry and the closed-flag of one execution context
//! and pulls entries from the shared channel in one of five modes.
//!
//! ## State machine
//! ```text
//!            consume Entry::Close
//!   Open ───────────────────────────► Closed   (never reset)
//!    │                                  │
//!    └─ read + dispatch                 └─ every consumption call: Err(Closed),
//!                                          channel untouched
//! ```
//!
//! ## Consumption modes
//! | Mode                             | Read happens on            | Listeners run on          |
//! |----------------------------------|----------------------------|---------------------------|
//! | `handle_next`                    | caller (per [`Get`])       | caller, or via adapter    |
//! | `handle_until_blocking`          | caller, non-blocking       | caller                    |
//! | `handle_until_closed`            | caller, blocking           | caller, or via adapter    |
//! | `threaded_handle_until_closed`   | worker thread              | adapter's target context  |
//! | `coro_handle_until_closed`       | worker pool, task suspended| calling async task        |
//!
//! ## Rules
//! - One logical consumer per receiver. Several receivers may share a channel, but then
//!   each entry goes to exactly one of them and ordering between them is unspecified.
//! - The closed-flag is set in whichever context performs the read that yields the marker.
//! - Listener errors are not isolated: they end the current call and any loop around it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::channel::{Args, Channel, Entry, Get, QueueChannel};
use crate::config::Config;
use crate::dispatch::registry::Registry;
use crate::dispatch::sender::Sender;
use crate::dispatch::slot::ReadSlot;
use crate::error::{ChannelError, DispatchError, ListenerError, PoolError};
use crate::listeners::Listener;
use crate::pool::{Offload, Pending, WorkerPool};
use crate::schedule::Schedule;

/// State shared between a receiver and the worker running its threaded loop.
#[derive(Clone)]
struct Core<C> {
    channel: C,
    registry: Registry,
    closed: Arc<AtomicBool>,
}

impl<C: Channel> Core<C> {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn mark_closed(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("shutdown marker consumed, receiver closed");
        }
    }

    fn ensure_open(&self) -> Result<(), DispatchError> {
        if self.is_closed() {
            Err(DispatchError::Closed)
        } else {
            Ok(())
        }
    }

    /// Reads one entry; a marker closes the receiver right here, in the reading context.
    fn read(&self, get: Get) -> Result<Entry, DispatchError> {
        self.ensure_open()?;
        let entry = self.channel.get(get)?;
        if entry.is_close() {
            self.mark_closed();
        }
        Ok(entry)
    }

    fn handle_received(&self, entry: Entry) -> Result<(), DispatchError> {
        match entry {
            Entry::Close => {
                self.mark_closed();
                Ok(())
            }
            Entry::Event(event) => self.registry.dispatch(&event),
        }
    }

    fn handle_next(&self, adapter: Option<&dyn Schedule>, get: Get) -> Result<(), DispatchError> {
        let entry = self.read(get)?;
        match adapter {
            None => self.handle_received(entry),
            Some(adapter) => {
                let core = self.clone();
                adapter.schedule(Box::new(move || core.handle_received(entry)));
                Ok(())
            }
        }
    }

    fn handle_until_closed(&self, adapter: Option<&dyn Schedule>) -> Result<(), DispatchError> {
        self.ensure_open()?;
        debug!(marshaled = adapter.is_some(), "receive loop started");
        while !self.is_closed() {
            if let Err(error) = self.handle_next(adapter, Get::blocking()) {
                debug!(error = error.as_label(), "receive loop aborted");
                return Err(error);
            }
        }
        debug!("receive loop finished");
        Ok(())
    }
}

/// Receiving end: listener registry, closed-flag and consumption modes.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use sigdispatch::{args, Dispatcher, Get};
///
/// let Dispatcher { sender, mut receiver } = Dispatcher::new();
/// receiver.connect("cb", |a| {
///     assert_eq!(a.get(0), Some(&serde_json::json!(54)));
///     Ok(())
/// });
///
/// sender.fire("cb", args![54]).unwrap();
/// receiver.handle_next(None, Get::timeout(Duration::from_secs(2))).unwrap();
/// ```
///
/// ## Dropping
/// Dropping a receiver does not close the channel: no shutdown marker is enqueued, since
/// it would stop whichever receiver reads it next. Call [`Receiver::close`] or
/// [`Sender::close`] explicitly to end a receive loop.
pub struct Receiver<C: Channel = QueueChannel> {
    core: Core<C>,
    config: Config,
    worker: Option<Arc<WorkerPool>>,
}

impl<C: Channel> Receiver<C> {
    /// Creates a receiver over `channel` with default configuration.
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, Config::default())
    }

    /// Creates a receiver over `channel`.
    pub fn with_config(channel: C, config: Config) -> Self {
        Self {
            core: Core {
                channel,
                registry: Registry::default(),
                closed: Arc::new(AtomicBool::new(false)),
            },
            config,
            worker: None,
        }
    }

    /// Returns a new receiver over the same channel with an empty registry and an open flag.
    ///
    /// This is how the receiving side is handed to another execution context: listeners
    /// connected here are not carried over.
    pub fn fresh(&self) -> Self {
        Self::with_config(self.core.channel.clone(), self.config.clone())
    }

    /// Returns a sender over the same channel.
    ///
    /// Lets a listener capture a way to stop its own receive loop.
    pub fn sender(&self) -> Sender<C> {
        Sender::new(self.core.channel.clone())
    }

    /// Appends `callback` to the listeners of `signal`.
    ///
    /// Connecting the same callback twice makes it run twice per event.
    pub fn connect<F>(&self, signal: impl Into<String>, callback: F)
    where
        F: Fn(&Args) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.core.registry.connect(signal.into(), Arc::new(callback));
    }

    /// Appends a [`Listener`] implementation to the listeners of `signal`.
    pub fn connect_listener<L: Listener>(&self, signal: impl Into<String>, listener: L) {
        self.core.registry.connect(signal.into(), Arc::new(listener));
    }

    /// Appends an already shared listener to the listeners of `signal`.
    pub fn connect_shared(&self, signal: impl Into<String>, listener: Arc<dyn Listener>) {
        self.core.registry.connect(signal.into(), listener);
    }

    /// Number of listeners connected to `signal`.
    pub fn listener_count(&self, signal: &str) -> usize {
        self.core.registry.count(signal)
    }

    /// Returns `true` once a shutdown marker has been consumed.
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Enqueues the shutdown marker, exactly like [`Sender::close`].
    pub fn close(&self) -> Result<(), ChannelError> {
        debug!("close requested by receiver");
        self.core.channel.put(Entry::Close)
    }

    /// Reads one entry as described by `get` and dispatches it.
    ///
    /// With an `adapter`, only the read happens here; the dispatch is handed to the
    /// adapter as a thunk and its outcome surfaces wherever the adapter runs it.
    ///
    /// ### Errors
    /// - [`DispatchError::Closed`] if already closed (the channel is not read).
    /// - [`DispatchError::Channel`] with `Empty`/`Timeout` when nothing arrived.
    /// - [`DispatchError::Listener`] when a listener failed (inline dispatch only).
    pub fn handle_next(&mut self, adapter: Option<&dyn Schedule>, get: Get) -> Result<(), DispatchError> {
        self.core.handle_next(adapter, get)
    }

    /// Handles everything already queued, then returns how many entries were handled.
    ///
    /// Stops at the first would-block condition. Reaching a shutdown marker is not a
    /// normal exit: the marker closes the receiver and the drain fails with
    /// [`DispatchError::Closed`], leaving whatever follows the marker queued.
    ///
    /// ### Hazard
    /// "Already queued" is only meaningful if nobody else consumes from the channel;
    /// with concurrent consumers this races and may return early or late.
    pub fn handle_until_blocking(&mut self) -> Result<usize, DispatchError> {
        let mut handled = 0;
        loop {
            match self.core.handle_next(None, Get::non_blocking()) {
                Ok(()) => handled += 1,
                Err(error) if error.is_would_block() => break,
                Err(error) => {
                    trace!(handled, error = error.as_label(), "drain stopped");
                    return Err(error);
                }
            }
        }
        trace!(handled, "drained queued entries");
        Ok(handled)
    }

    /// Blocks, handling entries until a shutdown marker is consumed.
    ///
    /// This is the loop's only normal exit; any error ends it.
    pub fn handle_until_closed(&mut self, adapter: Option<&dyn Schedule>) -> Result<(), DispatchError> {
        self.core.handle_until_closed(adapter)
    }

    /// Runs [`Self::handle_until_closed`] on a worker and returns immediately.
    ///
    /// Reads block on the worker; every dispatch is handed to `adapter`, which must run it
    /// in the context that should own listener execution (e.g. a [`Marshal`](crate::Marshal)
    /// drained by the calling thread). Without `worker`, a single-thread pool is created
    /// on first use and kept by this receiver.
    ///
    /// The returned handle resolves to the loop's outcome. Listener errors are reported where
    /// the adapter runs the thunk, not through this handle.
    pub fn threaded_handle_until_closed<A>(
        &mut self,
        adapter: A,
        worker: Option<Arc<WorkerPool>>,
    ) -> Result<Pending<Result<(), DispatchError>>, DispatchError>
    where
        A: Schedule + 'static,
    {
        self.core.ensure_open()?;
        let worker = match worker {
            Some(worker) => worker,
            None => Arc::clone(self.worker.get_or_insert_with(|| {
                Arc::new(WorkerPool::with_name(1, self.config.worker_name.clone()))
            })),
        };
        let core = self.core.clone();
        Ok(worker.submit(move || core.handle_until_closed(Some(&adapter))))
    }

    /// Async analogue of [`Self::handle_next`].
    ///
    /// The blocking read runs on `pool` while the calling task is suspended; listeners then
    /// run inline in the calling task.
    ///
    /// ### Cancellation
    /// Dropping the future abandons the read. The worker stops within a short slice, and an
    /// entry it already took is put back at the end of the channel, so no event is lost;
    /// its position relative to later entries is not kept.
    pub async fn coro_handle_next<P>(&mut self, pool: &P, get: Get) -> Result<(), DispatchError>
    where
        P: Offload,
    {
        self.core.ensure_open()?;
        let (slot, reader) = ReadSlot::new(self.core.channel.clone());
        pool.offload(move || reader.read(get)).await??;
        let entry = slot.take().ok_or(PoolError::Shutdown)?;
        self.core.handle_received(entry)
    }

    /// Async loop handling entries until a shutdown marker is consumed.
    ///
    /// A worker pool (`Config::pool_threads` threads) lives for the duration of the call
    /// and is released on every exit path.
    ///
    /// Cancelling the future behaves as for [`Self::coro_handle_next`]: the pending read
    /// is abandoned and its entry, if any, is re-queued.
    pub async fn coro_handle_until_closed(&mut self) -> Result<(), DispatchError> {
        self.core.ensure_open()?;
        let pool = WorkerPool::with_name(
            self.config.pool_threads_clamped(),
            self.config.worker_name.clone(),
        );
        debug!("async receive loop started");
        while !self.is_closed() {
            self.coro_handle_next(&pool, Get::blocking()).await?;
        }
        debug!("async receive loop finished");
        Ok(())
    }
}
