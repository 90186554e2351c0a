//! # Dispatcher configuration.
//!
//! Provides [`Config`], the settings used by [`Dispatcher::with_config`](crate::Dispatcher::with_config).
//!
//! ## Sentinel values
//! - `capacity = 0` → unbounded channel
//! - `pool_threads = 0` → treated as 1

/// Settings for a dispatcher and the workers its receiver creates.
///
/// ## Field semantics
/// - `capacity`: channel capacity (`0` = unbounded; a full bounded channel rejects `fire`/`close`)
/// - `pool_threads`: worker threads for the pool owned by `coro_handle_until_closed` (min 1)
/// - `worker_name`: thread name prefix for every worker pool the receiver creates
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of queued entries.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = once `n` entries are queued, `fire`/`close` fail with
    ///   [`ChannelError::Full`](crate::ChannelError::Full) until the receiver catches up
    ///
    /// Puts never wait, so a listener firing into its own full channel gets an error
    /// instead of blocking the thread that drains it.
    pub capacity: usize,

    /// Number of threads in the worker pool scoped to `coro_handle_until_closed`.
    ///
    /// One is enough for a single receiver; more only helps when the pool is shared.
    pub pool_threads: usize,

    /// Thread name prefix for worker pools.
    pub worker_name: String,
}

impl Config {
    /// Returns the channel capacity as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` queued entries
    #[inline]
    pub fn capacity_limit(&self) -> Option<usize> {
        if self.capacity == 0 {
            None
        } else {
            Some(self.capacity)
        }
    }

    /// Returns the pool size clamped to a minimum of 1.
    #[inline]
    pub fn pool_threads_clamped(&self) -> usize {
        self.pool_threads.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `capacity = 0` (unbounded)
    /// - `pool_threads = 1`
    /// - `worker_name = "sigdispatch-worker"`
    fn default() -> Self {
        Self {
            capacity: 0,
            pool_threads: 1,
            worker_name: "sigdispatch-worker".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        let mut cfg = Config::default();
        assert_eq!(cfg.capacity_limit(), None);
        cfg.capacity = 16;
        assert_eq!(cfg.capacity_limit(), Some(16));

        cfg.pool_threads = 0;
        assert_eq!(cfg.pool_threads_clamped(), 1);
    }
}
