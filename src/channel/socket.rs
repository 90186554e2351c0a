//! # Unix datagram socket [`Channel`] spanning processes.
//!
//! One process owns the inbox: a datagram socket bound to a filesystem path. Any
//! process can connect to that path and put entries; each entry travels as a single
//! datagram holding its JSON encoding.
//!
//! ```text
//!   process A: SocketChannel::connect(path) ──┐
//!   process B: SocketChannel::connect(path) ──┼──► inbox bound at `path` ──► get()
//!   owner:     SocketChannel::bind(path) ─────┘        (owner, or its forked children)
//! ```
//!
//! ## Rules
//! - Datagrams are delivered whole; concurrent producers never interleave bytes.
//! - `put` never waits: a full inbox reports [`ChannelError::Full`], a missing one
//!   [`ChannelError::Disconnected`].
//! - Only handles created by [`SocketChannel::bind`] (their clones, and copies inherited
//!   through `fork`) can `get`; a connected handle reports `Disconnected`.
//! - Entries larger than [`MAX_DATAGRAM`] bytes once encoded are rejected.

use std::io;
use std::os::fd::AsFd;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use tracing::{debug, trace, warn};

use crate::channel::{Channel, Entry, Get};
use crate::error::ChannelError;

/// Largest encoded entry accepted by [`SocketChannel`].
pub const MAX_DATAGRAM: usize = 64 * 1024;

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    outbox: UnixDatagram,
    inbox: Option<UnixDatagram>,
    /// Process that bound the inbox; only it removes the socket file.
    owner: Option<u32>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if self.owner == Some(std::process::id()) {
            match std::fs::remove_file(&self.path) {
                Ok(()) => debug!(path = %self.path.display(), "socket inbox removed"),
                Err(error) => warn!(%error, path = %self.path.display(), "failed to remove socket inbox"),
            }
        }
    }
}

/// Channel over a Unix datagram socket, usable across processes.
///
/// ## Example
/// ```rust,no_run
/// use std::time::Duration;
/// use sigdispatch::{args, Get, Receiver, Sender, SocketChannel};
///
/// // Receiving process.
/// let mut receiver = Receiver::new(SocketChannel::bind("/tmp/app.sock")?);
/// receiver.connect("cb", |_| Ok(()));
///
/// // Any other process.
/// let sender = Sender::new(SocketChannel::connect("/tmp/app.sock")?);
/// sender.fire("cb", args![54])?;
///
/// receiver.handle_next(None, Get::timeout(Duration::from_secs(2)))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct SocketChannel {
    inner: Arc<Inner>,
}

impl SocketChannel {
    /// Creates the inbox at `path`; the returned handle can both put and get.
    ///
    /// Fails if `path` already exists. The socket file is removed when the last handle
    /// of the binding process is dropped.
    pub fn bind(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inbox = UnixDatagram::bind(&path)?;
        inbox.set_nonblocking(true)?;
        debug!(path = %path.display(), "socket inbox bound");
        Self::build(path, Some(inbox))
    }

    /// Opens a put-only handle to the inbox at `path`.
    ///
    /// The inbox does not have to exist yet; puts report `Disconnected` until it does.
    pub fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::build(path.as_ref().to_path_buf(), None)
    }

    fn build(path: PathBuf, inbox: Option<UnixDatagram>) -> io::Result<Self> {
        let outbox = UnixDatagram::unbound()?;
        outbox.set_nonblocking(true)?;
        let owner = inbox.as_ref().map(|_| std::process::id());
        Ok(Self {
            inner: Arc::new(Inner {
                path,
                outbox,
                inbox,
                owner,
            }),
        })
    }

    /// Path of the inbox.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Returns `true` if this handle can read.
    pub fn is_inbox(&self) -> bool {
        self.inner.inbox.is_some()
    }
}

fn transport(error: impl std::fmt::Display) -> ChannelError {
    ChannelError::Transport {
        message: error.to_string(),
    }
}

/// Rounds up so a sub-millisecond remainder still waits instead of spinning.
fn poll_timeout(left: std::time::Duration) -> PollTimeout {
    let ms = left.as_micros().div_ceil(1000).min(u128::from(u16::MAX));
    PollTimeout::from(u16::try_from(ms).unwrap_or(u16::MAX))
}

impl Channel for SocketChannel {
    fn put(&self, entry: Entry) -> Result<(), ChannelError> {
        let bytes = serde_json::to_vec(&entry).map_err(transport)?;
        if bytes.len() > MAX_DATAGRAM {
            return Err(transport(format!(
                "encoded entry is {} bytes, limit is {MAX_DATAGRAM}",
                bytes.len()
            )));
        }
        match self.inner.outbox.send_to(&bytes, &self.inner.path) {
            Ok(_) => {
                trace!(bytes = bytes.len(), "datagram sent");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(ChannelError::Full),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused) => {
                Err(ChannelError::Disconnected)
            }
            Err(e) => Err(transport(e)),
        }
    }

    fn get(&self, get: Get) -> Result<Entry, ChannelError> {
        let inbox = self.inner.inbox.as_ref().ok_or(ChannelError::Disconnected)?;
        let deadline = get.timeout.map(|timeout| (Instant::now() + timeout, timeout));
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            match inbox.recv(&mut buf) {
                Ok(n) => return serde_json::from_slice(&buf[..n]).map_err(transport),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // Another reader may have taken the datagram poll reported.
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(transport(e)),
            }
            if !get.block {
                return Err(ChannelError::Empty);
            }

            let wait = match deadline {
                None => PollTimeout::NONE,
                Some((at, timeout)) => {
                    let left = at.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(ChannelError::Timeout { timeout });
                    }
                    poll_timeout(left)
                }
            };
            let mut fds = [PollFd::new(inbox.as_fd(), PollFlags::POLLIN)];
            match poll(&mut fds, wait) {
                Ok(_) | Err(Errno::EINTR) => {}
                Err(errno) => return Err(transport(errno)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use serde_json::{json, Value};

    use super::*;
    use crate::args;
    use crate::channel::Event;
    use crate::dispatch::{Receiver, Sender};

    const CHILD_INBOX: &str = "SIGDISPATCH_TEST_CHILD_INBOX";

    fn socket_path(tag: &str) -> PathBuf {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("sigdispatch-{tag}-{}-{n}.sock", std::process::id()))
    }

    #[test]
    fn entries_cross_the_socket_in_order() {
        let inbox = SocketChannel::bind(socket_path("order")).unwrap();
        let producer = SocketChannel::connect(inbox.path()).unwrap();

        for i in 0..3 {
            producer.put(Entry::Event(Event::new("n", args![i]))).unwrap();
        }
        producer.put(Entry::Close).unwrap();

        for i in 0..3 {
            match inbox.get(Get::non_blocking()).unwrap() {
                Entry::Event(ev) => assert_eq!(ev.args.get(0), Some(&json!(i))),
                Entry::Close => panic!("marker arrived early"),
            }
        }
        assert!(inbox.get(Get::blocking()).unwrap().is_close());
    }

    #[test]
    fn empty_inbox_reports_would_block_conditions() {
        let inbox = SocketChannel::bind(socket_path("empty")).unwrap();
        assert_eq!(inbox.get(Get::non_blocking()).unwrap_err(), ChannelError::Empty);

        let started = Instant::now();
        let err = inbox.get(Get::timeout(Duration::from_millis(40))).unwrap_err();
        assert_eq!(
            err,
            ChannelError::Timeout {
                timeout: Duration::from_millis(40)
            }
        );
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn connected_handle_cannot_read_and_missing_inbox_disconnects() {
        let path = socket_path("gone");
        let producer = SocketChannel::connect(&path).unwrap();
        assert!(!producer.is_inbox());
        assert_eq!(producer.put(Entry::Close).unwrap_err(), ChannelError::Disconnected);
        assert_eq!(
            producer.get(Get::non_blocking()).unwrap_err(),
            ChannelError::Disconnected
        );

        let inbox = SocketChannel::bind(&path).unwrap();
        producer.put(Entry::Close).unwrap();
        assert!(inbox.get(Get::non_blocking()).unwrap().is_close());

        drop(inbox);
        assert!(!path.exists());
        assert_eq!(producer.put(Entry::Close).unwrap_err(), ChannelError::Disconnected);
    }

    #[test]
    fn oversized_entry_is_rejected() {
        let inbox = SocketChannel::bind(socket_path("big")).unwrap();
        let big = "x".repeat(MAX_DATAGRAM);
        let err = inbox.put(Entry::Event(Event::new("n", args![big]))).unwrap_err();
        assert_eq!(err.as_label(), "channel_transport");
        assert_eq!(inbox.get(Get::non_blocking()).unwrap_err(), ChannelError::Empty);
    }

    #[test]
    fn receive_loop_over_socket_with_thread_producer() {
        let inbox = SocketChannel::bind(socket_path("loop")).unwrap();
        let sender = Sender::new(SocketChannel::connect(inbox.path()).unwrap());
        let mut receiver = Receiver::new(inbox);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        receiver.connect("cb", move |a| {
            s.lock().unwrap().push(a.get(0).cloned().unwrap_or(Value::Null));
            Ok(())
        });

        let producer = thread::spawn(move || {
            for v in [43, 54, 87] {
                sender.fire("cb", args![v]).unwrap();
            }
            sender.close().unwrap();
        });
        receiver.handle_until_closed(None).unwrap();
        producer.join().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![json!(43), json!(54), json!(87)]);
    }

    /// Receiving side of `handle_next_in_child_process_with_timeout`; a no-op unless
    /// started by that test.
    #[test]
    fn child_process_receiver() {
        let Some(path) = std::env::var_os(CHILD_INBOX) else {
            return;
        };
        let mut receiver = Receiver::new(SocketChannel::bind(path).unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        receiver.connect("cb", move |a| {
            s.lock().unwrap().push(a.get(0).cloned().unwrap_or(Value::Null));
            Ok(())
        });

        receiver
            .handle_next(None, Get::timeout(Duration::from_secs(2)))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![json!(54)]);
    }

    #[test]
    fn handle_next_in_child_process_with_timeout() {
        let path = socket_path("child");
        let mut child = Command::new(std::env::current_exe().unwrap())
            .args([
                "--exact",
                "channel::socket::tests::child_process_receiver",
                "--test-threads=1",
            ])
            .env(CHILD_INBOX, &path)
            .spawn()
            .unwrap();

        let started = Instant::now();
        while !path.exists() {
            if let Some(status) = child.try_wait().unwrap() {
                panic!("child exited before binding its inbox: {status}");
            }
            assert!(started.elapsed() < Duration::from_secs(10), "child never bound its inbox");
            thread::sleep(Duration::from_millis(10));
        }
        Sender::new(SocketChannel::connect(&path).unwrap())
            .fire("cb", args![54])
            .unwrap();

        let status = child.wait().unwrap();
        assert!(status.success(), "child receiver failed: {status}");
        assert!(!path.exists());
    }
}
