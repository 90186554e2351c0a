//! Pairs one [`Sender`] and one [`Receiver`] over a single channel.

use crate::channel::{Channel, QueueChannel};
use crate::config::Config;
use crate::dispatch::{Receiver, Sender};

/// One channel, one sending view, one receiving view.
///
/// Both views are `Send`, so either can be moved to another thread or task. The
/// receiver's listeners and closed-flag stay with that receiver instance; use
/// [`Receiver::fresh`] to build a separate receiving side for another context.
///
/// ## Example
/// ```rust
/// use sigdispatch::{args, Dispatcher};
///
/// let Dispatcher { sender, mut receiver } = Dispatcher::new();
/// receiver.connect("progress", |_args| Ok(()));
///
/// let producer = std::thread::spawn(move || {
///     for pct in [10, 50, 100] {
///         sender.fire("progress", args![pct]).unwrap();
///     }
///     sender.close().unwrap();
/// });
///
/// receiver.handle_until_closed(None).unwrap();
/// producer.join().unwrap();
/// assert!(receiver.is_closed());
/// ```
pub struct Dispatcher<C: Channel = QueueChannel> {
    /// Sending view.
    pub sender: Sender<C>,
    /// Receiving view.
    pub receiver: Receiver<C>,
}

impl Dispatcher {
    /// Creates a dispatcher over an unbounded in-memory channel with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a dispatcher over an in-memory channel sized by `config.capacity`.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let channel = QueueChannel::with_capacity(config.capacity_limit());
        Self::with_channel_and_config(channel, config)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Channel> Dispatcher<C> {
    /// Creates a dispatcher over a caller-supplied channel.
    pub fn with_channel(channel: C) -> Self {
        Self::with_channel_and_config(channel, Config::default())
    }

    /// Creates a dispatcher over a caller-supplied channel with explicit settings.
    pub fn with_channel_and_config(channel: C, config: Config) -> Self {
        Self {
            sender: Sender::new(channel.clone()),
            receiver: Receiver::with_config(channel, config),
        }
    }

    /// Splits into the two views.
    pub fn into_parts(self) -> (Sender<C>, Receiver<C>) {
        (self.sender, self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::args;
    use crate::channel::Get;
    use crate::error::ChannelError;

    #[test]
    fn bounded_config_rejects_fire_when_full() {
        let cfg = Config {
            capacity: 1,
            ..Config::default()
        };
        let (sender, mut receiver) = Dispatcher::with_config(cfg).into_parts();
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        receiver.connect("tick", move |_| {
            *c.lock().unwrap() += 1;
            Ok(())
        });

        sender.fire("tick", args![0]).unwrap();
        let err = sender.fire("tick", args![1]).unwrap_err();
        assert_eq!(err, ChannelError::Full);

        receiver.handle_next(None, Get::non_blocking()).unwrap();
        sender.fire("tick", args![1]).unwrap();
        receiver.handle_next(None, Get::non_blocking()).unwrap();
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn listener_firing_into_full_channel_does_not_block() {
        let cfg = Config {
            capacity: 1,
            ..Config::default()
        };
        let (sender, mut receiver) = Dispatcher::with_config(cfg).into_parts();
        let echo = receiver.sender();
        receiver.connect("ping", move |_| {
            echo.fire("pong", ())?;
            echo.fire("pong", ())?;
            Ok(())
        });

        sender.fire("ping", ()).unwrap();
        let err = receiver.handle_next(None, Get::blocking()).unwrap_err();
        assert_eq!(err.as_label(), "dispatch_listener_failed");
        // First echo fits; the second was rejected instead of waiting on this thread.
        assert_eq!(receiver.sender().channel().len(), 1);
    }

    #[test]
    fn custom_channel_is_shared_by_both_views() {
        let channel = QueueChannel::unbounded();
        let mut d = Dispatcher::with_channel(channel.clone());
        d.sender.fire("x", ()).unwrap();
        assert_eq!(channel.len(), 1);
        d.receiver
            .handle_next(None, Get::timeout(Duration::from_secs(1)))
            .unwrap();
        assert!(channel.is_empty());
    }

    #[test]
    fn receiver_close_stops_its_own_loop() {
        let Dispatcher { sender, mut receiver } = Dispatcher::default();
        sender.fire("x", ()).unwrap();
        receiver.close().unwrap();
        receiver.handle_until_closed(None).unwrap();
        assert!(receiver.is_closed());
    }
}
