//! # Worker pools for blocking calls.
//!
//! The cooperative receive mode never blocks its scheduler thread: each channel read
//! is handed to an [`Offload`] implementation and the calling task resumes when the
//! read's [`Pending`] result resolves.
//!
//! - [`WorkerPool`]: dedicated named OS threads; also runs the threaded receive loop.
//! - [`TokioBlocking`]: tokio's blocking thread pool of the current runtime.

mod pending;
mod worker;

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::warn;

pub use pending::Pending;
pub use worker::WorkerPool;

/// Runs a blocking call somewhere that is not the caller's scheduler thread.
///
/// ### Implementation requirements
/// - `offload` returns immediately.
/// - The job runs exactly once, or the handle resolves to `PoolError::Shutdown`.
pub trait Offload {
    /// Starts `f` on a worker and returns a handle to its result.
    fn offload<T, F>(&self, f: F) -> Pending<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;
}

impl<P: Offload + ?Sized> Offload for Arc<P> {
    fn offload<T, F>(&self, f: F) -> Pending<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        (**self).offload(f)
    }
}

/// [`Offload`] onto the blocking pool of the ambient tokio runtime.
///
/// Outside a runtime every job resolves to `PoolError::Shutdown`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioBlocking;

impl Offload for TokioBlocking {
    fn offload<T, F>(&self, f: F) -> Pending<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (done, pending) = Pending::pair();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || done.complete_with(f));
            }
            Err(error) => warn!(%error, "no tokio runtime to offload onto"),
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoolError;

    #[tokio::test]
    async fn tokio_blocking_runs_job() {
        let v = TokioBlocking.offload(|| "done").await.unwrap();
        assert_eq!(v, "done");
    }

    #[test]
    fn tokio_blocking_without_runtime_resolves_to_shutdown() {
        let res = TokioBlocking.offload(|| 1).wait();
        assert_eq!(res, Err(PoolError::Shutdown));
    }

    #[tokio::test]
    async fn arc_pool_offloads() {
        let pool = Arc::new(WorkerPool::new(1));
        assert_eq!(pool.offload(|| 3).await.unwrap(), 3);
    }
}
