//! Sending end of a dispatcher.

use tracing::{debug, trace};

use crate::channel::{Args, Channel, Entry, Event, QueueChannel};
use crate::error::ChannelError;

/// Fire-and-forget facade over a channel handle.
///
/// Cheap to clone; every clone writes to the same channel. Listeners never run here.
#[derive(Clone, Debug)]
pub struct Sender<C: Channel = QueueChannel> {
    channel: C,
}

impl<C: Channel> Sender<C> {
    /// Creates a sender writing to `channel`.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Enqueues an event for `signal` with `args`.
    ///
    /// Channel failures are returned unmodified and never retried.
    pub fn fire(&self, signal: impl Into<String>, args: impl Into<Args>) -> Result<(), ChannelError> {
        let event = Event::new(signal, args);
        trace!(signal = %event.signal, "fire");
        self.channel.put(Entry::Event(event))
    }

    /// Enqueues the shutdown marker.
    ///
    /// Calling it more than once enqueues more markers; the first one consumed closes
    /// the receiver and the rest are never read by it.
    pub fn close(&self) -> Result<(), ChannelError> {
        debug!("close requested by sender");
        self.channel.put(Entry::Close)
    }

    /// The underlying channel handle.
    pub fn channel(&self) -> &C {
        &self.channel
    }
}
