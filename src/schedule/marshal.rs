//! # Thunk queue drained by a designated thread.
//!
//! [`Marshal`] is the plain-thread scheduling adapter: workers push thunks through a
//! [`MarshalHandle`], and the thread that owns the [`Marshal`] runs them when it calls
//! [`Marshal::run_pending`] or [`Marshal::run_next`] (the equivalent of an event loop's
//! "call soon, thread-safe" primitive).
//!
//! ## Rules
//! - Thunks run in the order they were scheduled, only on the draining thread.
//! - The first failing thunk stops the drain and its error is returned; the rest stay queued.

use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError};
use tracing::warn;

use crate::error::DispatchError;
use crate::schedule::{Schedule, Thunk};

/// Queue of thunks to be run by the thread that drains it.
#[derive(Debug)]
pub struct Marshal {
    tx: channel::Sender<Thunk>,
    rx: channel::Receiver<Thunk>,
}

/// Cloneable adapter that schedules thunks onto a [`Marshal`].
#[derive(Clone, Debug)]
pub struct MarshalHandle {
    tx: channel::Sender<Thunk>,
}

impl Marshal {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    /// Returns an adapter that schedules onto this queue.
    pub fn handle(&self) -> MarshalHandle {
        MarshalHandle {
            tx: self.tx.clone(),
        }
    }

    /// Runs every thunk already queued, without waiting.
    ///
    /// Returns how many ran.
    pub fn run_pending(&self) -> Result<usize, DispatchError> {
        let mut ran = 0;
        while let Ok(thunk) = self.rx.try_recv() {
            thunk()?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Waits up to `timeout` for one thunk and runs it.
    ///
    /// Returns `false` if nothing arrived in time.
    pub fn run_next(&self, timeout: Duration) -> Result<bool, DispatchError> {
        match self.rx.recv_timeout(timeout) {
            Ok(thunk) => {
                thunk()?;
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(false),
        }
    }

    /// Number of thunks waiting to run.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no thunk is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for Marshal {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule for MarshalHandle {
    fn schedule(&self, thunk: Thunk) {
        if self.tx.send(thunk).is_err() {
            warn!("marshal queue is gone; dispatch dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn thunks_run_on_draining_thread() {
        let marshal = Marshal::new();
        let handle = marshal.handle();
        let me = thread::current().id();

        let ran_on = Arc::new(std::sync::Mutex::new(None));
        let slot = Arc::clone(&ran_on);
        thread::spawn(move || {
            handle.schedule(Box::new(move || {
                *slot.lock().unwrap() = Some(thread::current().id());
                Ok(())
            }));
        })
        .join()
        .unwrap();

        assert!(marshal.run_next(Duration::from_secs(1)).unwrap());
        assert_eq!(*ran_on.lock().unwrap(), Some(me));
    }

    #[test]
    fn failing_thunk_stops_drain() {
        let marshal = Marshal::new();
        let handle = marshal.handle();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        handle.schedule(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        handle.schedule(Box::new(|| Err(DispatchError::Closed)));
        let c = Arc::clone(&count);
        handle.schedule(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        assert!(matches!(marshal.run_pending(), Err(DispatchError::Closed)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(marshal.len(), 1);
        assert_eq!(marshal.run_pending().unwrap(), 1);
        assert!(marshal.is_empty());
    }

    #[test]
    fn run_next_times_out_quietly() {
        let marshal = Marshal::default();
        assert!(!marshal.run_next(Duration::from_millis(10)).unwrap());
    }
}
