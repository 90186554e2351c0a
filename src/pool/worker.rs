//! # Dedicated OS worker threads.
//!
//! [`WorkerPool`] runs blocking jobs (channel reads, whole receive loops) on named
//! threads fed by a shared job queue.
//!
//! ## Architecture
//! ```text
//! submit(job) ──► [job queue] ──► worker-0 ──► job() ──► Pending<T>
//!                       └───────► worker-N ──► job() ──► Pending<T>
//! ```
//!
//! ## Rules
//! - Jobs run in submission order per worker; with several workers there is no global order.
//! - A panicking job is reported through its [`Pending`]; the worker keeps serving.
//! - Dropping the pool closes the queue. Idle workers exit; a worker blocked in a job
//!   exits once that job returns. Threads are detached, never joined.

use std::thread;

use crossbeam::channel;
use tracing::{debug, trace, warn};

use crate::pool::{Offload, Pending};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool of named worker threads for blocking jobs.
#[derive(Debug)]
pub struct WorkerPool {
    jobs: Option<channel::Sender<Job>>,
    name: String,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool of `threads` workers (min 1) named `sigdispatch-worker-<n>`.
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self::with_name(threads, "sigdispatch-worker")
    }

    /// Creates a pool of `threads` workers (min 1) named `<name>-<n>`.
    ///
    /// ### Notes
    /// - A worker that fails to spawn is logged and skipped.
    /// - If none could be spawned, every submitted job resolves to `PoolError::Shutdown`.
    #[must_use]
    pub fn with_name(threads: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        let (tx, rx) = channel::unbounded::<Job>();

        let mut size = 0;
        for idx in 0..threads.max(1) {
            let rx = rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("{name}-{idx}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                    trace!("worker queue closed, exiting");
                });
            match spawned {
                Ok(_) => size += 1,
                Err(error) => warn!(%error, worker = idx, pool = %name, "failed to spawn worker"),
            }
        }
        debug!(pool = %name, size, "worker pool started");

        Self {
            jobs: if size > 0 { Some(tx) } else { None },
            name,
            size,
        }
    }

    /// Submits a job and returns a handle to its result.
    pub fn submit<T, F>(&self, f: F) -> Pending<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (done, pending) = Pending::pair();
        let job: Job = Box::new(move || done.complete_with(f));
        match &self.jobs {
            Some(jobs) => {
                // On failure the job (and its completer) is dropped, resolving `pending` to Shutdown.
                if jobs.send(job).is_err() {
                    warn!(pool = %self.name, "job queue closed");
                }
            }
            None => warn!(pool = %self.name, "worker pool has no workers"),
        }
        pending
    }

    /// Number of workers actually running.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Pool name (thread name prefix).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Offload for WorkerPool {
    fn offload<T, F>(&self, f: F) -> Pending<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(f)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.jobs.take().is_some() {
            debug!(pool = %self.name, "worker pool released");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::error::PoolError;

    #[test]
    fn runs_job_on_named_worker() {
        let pool = WorkerPool::with_name(1, "test-pool");
        let name = pool
            .submit(|| thread::current().name().map(str::to_owned))
            .wait()
            .unwrap();
        assert_eq!(name.as_deref(), Some("test-pool-0"));
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn panic_is_reported_and_worker_survives() {
        let pool = WorkerPool::new(1);
        let err = pool.submit(|| -> u32 { panic!("boom") }).wait().unwrap_err();
        assert_eq!(
            err,
            PoolError::Panicked {
                message: "boom".into()
            }
        );
        assert_eq!(pool.submit(|| 7).wait().unwrap(), 7);
    }

    #[test]
    fn drop_lets_running_job_finish() {
        let (tx, rx) = mpsc::channel();
        let pending = {
            let pool = WorkerPool::new(1);
            pool.submit(move || {
                thread::sleep(Duration::from_millis(20));
                tx.send(1).unwrap();
                2
            })
        };
        assert_eq!(pending.wait().unwrap(), 2);
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 1);
    }

    #[test]
    fn dropped_pending_does_not_stop_the_job() {
        let (tx, rx) = mpsc::channel();
        let pool = WorkerPool::new(1);
        drop(pool.submit(move || tx.send(5).unwrap()));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 5);
    }

    #[tokio::test]
    async fn pending_can_be_awaited() {
        let pool = WorkerPool::new(2);
        let v = pool.offload(|| 40 + 2).await.unwrap();
        assert_eq!(v, 42);
    }
}
