//! In-memory [`Channel`] backed by a crossbeam MPMC queue.

use crossbeam::channel::{self, RecvTimeoutError, TryRecvError, TrySendError};

use crate::channel::{Channel, Entry, Get};
use crate::error::ChannelError;

/// In-memory multi-producer queue usable across threads and tasks.
///
/// Holds both queue ends, so it never disconnects while any clone is alive.
/// `put` never waits: with a capacity limit, a full queue fails the `put` with
/// [`ChannelError::Full`] and the entry is not queued.
#[derive(Clone, Debug)]
pub struct QueueChannel {
    tx: channel::Sender<Entry>,
    rx: channel::Receiver<Entry>,
}

impl QueueChannel {
    /// Creates an unbounded queue.
    #[must_use]
    pub fn unbounded() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    /// Creates a queue holding at most `capacity` entries (min 1).
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = channel::bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Creates a queue from an optional capacity limit (`None` = unbounded).
    #[must_use]
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(cap) => Self::bounded(cap),
            None => Self::unbounded(),
        }
    }

    /// Number of entries currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for QueueChannel {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Channel for QueueChannel {
    fn put(&self, entry: Entry) -> Result<(), ChannelError> {
        self.tx.try_send(entry).map_err(|e| match e {
            TrySendError::Full(_) => ChannelError::Full,
            TrySendError::Disconnected(_) => ChannelError::Disconnected,
        })
    }

    fn get(&self, get: Get) -> Result<Entry, ChannelError> {
        if !get.block {
            return self.rx.try_recv().map_err(|e| match e {
                TryRecvError::Empty => ChannelError::Empty,
                TryRecvError::Disconnected => ChannelError::Disconnected,
            });
        }
        match get.timeout {
            None => self.rx.recv().map_err(|_| ChannelError::Disconnected),
            Some(timeout) => self.rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => ChannelError::Timeout { timeout },
                RecvTimeoutError::Disconnected => ChannelError::Disconnected,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::channel::Event;

    #[test]
    fn fifo_per_producer() {
        let q = QueueChannel::unbounded();
        for i in 0..5 {
            q.put(Entry::Event(Event::new("n", crate::args![i]))).unwrap();
        }
        q.put(Entry::Close).unwrap();

        for i in 0..5 {
            match q.get(Get::non_blocking()).unwrap() {
                Entry::Event(ev) => assert_eq!(ev.args.get(0), Some(&serde_json::json!(i))),
                Entry::Close => panic!("marker arrived early"),
            }
        }
        assert!(q.get(Get::non_blocking()).unwrap().is_close());
    }

    #[test]
    fn non_blocking_get_on_empty_queue_reports_empty() {
        let q = QueueChannel::default();
        let err = q.get(Get::non_blocking()).unwrap_err();
        assert!(matches!(err, ChannelError::Empty));
        assert!(err.is_would_block());
    }

    #[test]
    fn timed_get_reports_timeout() {
        let q = QueueChannel::bounded(4);
        let started = Instant::now();
        let err = q.get(Get::timeout(Duration::from_millis(30))).unwrap_err();
        assert!(matches!(err, ChannelError::Timeout { .. }));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn full_bounded_queue_rejects_put_without_waiting() {
        let q = QueueChannel::bounded(1);
        q.put(Entry::Close).unwrap();
        let err = q.put(Entry::Event(Event::new("n", ()))).unwrap_err();
        assert_eq!(err, ChannelError::Full);
        assert_eq!(q.len(), 1);

        assert!(q.get(Get::non_blocking()).unwrap().is_close());
        q.put(Entry::Close).unwrap();
    }

    #[test]
    fn clones_share_one_queue() {
        let a = QueueChannel::unbounded();
        let b = a.clone();
        a.put(Entry::Close).unwrap();
        assert_eq!(b.len(), 1);
        assert!(b.get(Get::blocking()).unwrap().is_close());
        assert!(a.is_empty());
    }
}
