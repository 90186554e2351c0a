//! Error types used by the dispatcher, its channel and its worker pools.
//!
//! This module defines three error enums:
//!
//! - [`DispatchError`]: errors returned by every consumption entry point of a receiver.
//! - [`ChannelError`]: conditions reported by a [`Channel`](crate::Channel) read or write.
//! - [`PoolError`]: failures of a worker that was running a blocking call.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// Error returned by a listener.
///
/// Listener errors are never isolated: the first one aborts the current consumption call.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by the receiving side.
///
/// `Closed` is the expected end-of-stream signal; everything else terminates
/// whichever consumption loop observed it.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The receiver already consumed a shutdown marker.
    #[error("receiver is closed")]
    Closed,

    /// A listener failed while handling an event.
    #[error("listener for signal {signal:?} failed: {source}")]
    Listener {
        /// Signal of the event being dispatched.
        signal: String,
        /// The listener's own error, unmodified.
        #[source]
        source: ListenerError,
    },

    /// The channel read found nothing or the transport broke.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The worker that ran the blocking read failed.
    #[error(transparent)]
    Worker(#[from] PoolError),
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sigdispatch::DispatchError;
    ///
    /// assert_eq!(DispatchError::Closed.as_label(), "dispatch_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Closed => "dispatch_closed",
            DispatchError::Listener { .. } => "dispatch_listener_failed",
            DispatchError::Channel(e) => e.as_label(),
            DispatchError::Worker(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Closed => "receiver closed".to_string(),
            DispatchError::Listener { signal, source } => {
                format!("listener failed: signal={signal} error={source}")
            }
            DispatchError::Channel(e) => e.as_message(),
            DispatchError::Worker(e) => e.as_message(),
        }
    }

    /// Returns `true` if the channel simply had nothing to hand out.
    ///
    /// Loops that drain "whatever is queued right now" stop on this condition.
    pub fn is_would_block(&self) -> bool {
        matches!(self, DispatchError::Channel(e) if e.is_would_block())
    }
}

/// # Conditions reported by a channel.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A non-blocking read found no entry.
    #[error("channel is empty")]
    Empty,

    /// A timed read found no entry within its deadline.
    #[error("timed out after {timeout:?} waiting for an entry")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// A bounded channel had no room for a `put`; the entry was not queued.
    #[error("channel is full")]
    Full,

    /// An entry could not be encoded, decoded or moved by the transport.
    #[error("channel transport failed: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// The transport is gone; fatal, never retried.
    #[error("channel disconnected")]
    Disconnected,
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sigdispatch::ChannelError;
    /// use std::time::Duration;
    ///
    /// let err = ChannelError::Timeout { timeout: Duration::from_secs(2) };
    /// assert_eq!(err.as_label(), "channel_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::Empty => "channel_empty",
            ChannelError::Timeout { .. } => "channel_timeout",
            ChannelError::Full => "channel_full",
            ChannelError::Transport { .. } => "channel_transport",
            ChannelError::Disconnected => "channel_disconnected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ChannelError::Empty => "empty".to_string(),
            ChannelError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ChannelError::Full => "full".to_string(),
            ChannelError::Transport { message } => format!("transport: {message}"),
            ChannelError::Disconnected => "disconnected".to_string(),
        }
    }

    /// Returns `true` for [`ChannelError::Empty`] and [`ChannelError::Timeout`].
    ///
    /// [`ChannelError::Full`] is a write-side condition and is not included.
    ///
    /// # Example
    /// ```
    /// use sigdispatch::ChannelError;
    ///
    /// assert!(ChannelError::Empty.is_would_block());
    /// assert!(!ChannelError::Disconnected.is_would_block());
    /// assert!(!ChannelError::Full.is_would_block());
    /// ```
    pub fn is_would_block(&self) -> bool {
        matches!(self, ChannelError::Empty | ChannelError::Timeout { .. })
    }
}

/// # Worker failures.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool stopped before the job produced a result.
    #[error("worker pool shut down before the job completed")]
    Shutdown,

    /// The job panicked on the worker.
    #[error("job panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::Shutdown => "pool_shutdown",
            PoolError::Panicked { .. } => "pool_job_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PoolError::Shutdown => "pool shut down".to_string(),
            PoolError::Panicked { message } => format!("panicked: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_delegate_to_inner_errors() {
        let err = DispatchError::from(ChannelError::Empty);
        assert_eq!(err.as_label(), "channel_empty");
        assert!(err.is_would_block());

        let err = DispatchError::from(PoolError::Shutdown);
        assert_eq!(err.as_label(), "pool_shutdown");
        assert!(!err.is_would_block());
    }

    #[test]
    fn listener_error_keeps_source() {
        let err = DispatchError::Listener {
            signal: "cb".into(),
            source: "boom".into(),
        };
        assert_eq!(err.as_label(), "dispatch_listener_failed");
        let src = std::error::Error::source(&err).expect("source");
        assert_eq!(src.to_string(), "boom");
    }
}
