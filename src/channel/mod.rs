//! # Shared FIFO channel between senders and a receiver.
//!
//! [`Channel`] is the only shared mutable resource of the dispatcher. The crate needs
//! three things from it: `put`, blocking/timed `get`, and non-blocking `get`.
//!
//! ```text
//!   Sender::fire ──┐
//!   Sender::close ─┼──► Channel (FIFO of Entry) ──► Receiver::handle_next ──► listeners
//!   Receiver::close┘
//! ```
//!
//! ## Rules
//! - Many producers may `put` concurrently; writers only ever append.
//! - Entries are consumed at most once, FIFO per producer; no ordering across producers.
//! - Empty and timeout conditions are reported as [`ChannelError`], never swallowed.
//!
//! Implementations:
//! - [`QueueChannel`]: in-memory queue for threads and tasks of one process (the default).
//! - `SocketChannel` (Unix only): datagram socket inbox shared by several processes.

mod entry;
mod queue;
#[cfg(unix)]
mod socket;

use std::time::Duration;

use crate::error::ChannelError;

pub use entry::{Args, Entry, Event};
pub use queue::QueueChannel;
#[cfg(unix)]
pub use socket::{SocketChannel, MAX_DATAGRAM};

/// How a [`Channel::get`] call waits for an entry.
///
/// ## Variants
/// - `Get::blocking()` waits until an entry arrives.
/// - `Get::timeout(d)` waits at most `d`, then fails with [`ChannelError::Timeout`].
/// - `Get::non_blocking()` fails with [`ChannelError::Empty`] if nothing is queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Get {
    /// Whether the call may wait at all.
    pub block: bool,
    /// Upper bound on the wait when blocking (`None` = forever).
    pub timeout: Option<Duration>,
}

impl Get {
    /// Wait until an entry arrives.
    pub const fn blocking() -> Self {
        Self {
            block: true,
            timeout: None,
        }
    }

    /// Wait at most `timeout`.
    pub const fn timeout(timeout: Duration) -> Self {
        Self {
            block: true,
            timeout: Some(timeout),
        }
    }

    /// Do not wait.
    pub const fn non_blocking() -> Self {
        Self {
            block: false,
            timeout: None,
        }
    }
}

impl Default for Get {
    fn default() -> Self {
        Self::blocking()
    }
}

/// FIFO transport connecting senders to a receiver.
///
/// Implementations are cheap handles (`Clone`) to one underlying queue; every clone
/// reads from and writes to the same entries.
///
/// ### Implementation requirements
/// - `put` must be safe for concurrent producers and must not wait on consumers; a
///   transport without room reports [`ChannelError::Full`].
/// - `get` must honor [`Get`] and report "nothing arrived" as
///   [`ChannelError::Empty`] or [`ChannelError::Timeout`].
/// - Transport failure is reported as [`ChannelError::Disconnected`]; callers treat it as fatal.
pub trait Channel: Clone + Send + Sync + 'static {
    /// Appends an entry.
    fn put(&self, entry: Entry) -> Result<(), ChannelError>;

    /// Removes and returns the oldest entry, waiting as described by `get`.
    fn get(&self, get: Get) -> Result<Entry, ChannelError>;
}
