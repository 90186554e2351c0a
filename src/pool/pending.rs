//! Result handle for a job running on a worker.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::PoolError;

/// Handle to the result of a job submitted to a worker.
///
/// - Await it from async code (resumes the awaiting task when the job finishes).
/// - Call [`Pending::wait`] from plain threads.
///
/// If the worker goes away before producing a result, the handle resolves to
/// [`PoolError::Shutdown`]; a panicking job resolves to [`PoolError::Panicked`].
///
/// Dropping the handle does not stop the job. Its result is discarded with a warning,
/// so jobs whose result must not be lost need their own hand-over.
#[must_use = "a pending result does nothing unless awaited or waited on"]
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, PoolError>>,
}

/// Worker-side half of a [`Pending`].
pub(crate) struct Completer<T> {
    tx: oneshot::Sender<Result<T, PoolError>>,
}

impl<T> Pending<T> {
    pub(crate) fn pair() -> (Completer<T>, Pending<T>) {
        let (tx, rx) = oneshot::channel();
        (Completer { tx }, Pending { rx })
    }

    /// Blocks the current thread until the job finishes.
    ///
    /// # Panics
    /// Panics when called from inside an async runtime; `.await` the handle there instead.
    pub fn wait(self) -> Result<T, PoolError> {
        self.rx.blocking_recv().unwrap_or(Err(PoolError::Shutdown))
    }

    /// Returns the result if the job already finished, without waiting.
    pub fn try_take(&mut self) -> Option<Result<T, PoolError>> {
        match self.rx.try_recv() {
            Ok(res) => Some(res),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(PoolError::Shutdown)),
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, PoolError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(PoolError::Shutdown)))
    }
}

impl<T> Completer<T> {
    /// Runs `f`, catching panics, and hands the outcome to the [`Pending`] side.
    ///
    /// **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
    /// if the job panics while holding a lock.
    pub(crate) fn complete_with<F>(self, f: F)
    where
        F: FnOnce() -> T,
    {
        let res = panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
            let any = &*payload;
            let message = if let Some(msg) = any.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = any.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            tracing::warn!(%message, "worker job panicked");
            PoolError::Panicked { message }
        });
        if self.tx.send(res).is_err() {
            tracing::warn!("job finished after its pending handle was dropped, result discarded");
        }
    }
}
