//! # sigdispatch
//!
//! **sigdispatch** is a minimal signal dispatcher for Rust.
//!
//! Independent execution contexts (threads, async tasks, or processes given a
//! process-spanning [`Channel`]) exchange named events through one shared FIFO channel;
//! listener callbacks run on the receiving side only.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │    Sender    │   │    Sender    │   │   Receiver   │
//!   │  fire/close  │   │  fire/close  │   │    close     │
//!   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!          ▼                  ▼                  ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │           Channel (FIFO of Entry::{Event, Close})        │
//! └─────────────────────────────┬────────────────────────────┘
//!                               ▼
//!                  ┌────────────────────────┐
//!                  │        Receiver        │
//!                  │  closed-flag + Registry│
//!                  └───┬────────────────┬───┘
//!                      ▼                ▼
//!            inline dispatch     Schedule adapter ──► target context
//!                      │                                  │
//!                      ▼                                  ▼
//!            listener 1..N (registration order, first error aborts)
//! ```
//!
//! ### Consumption modes
//! ```text
//! handle_next(adapter, get)        one read (blocking / timeout / non-blocking)
//! handle_until_blocking()          drain what is queued, never wait
//! handle_until_closed(adapter)     loop { handle_next } until Close consumed
//! threaded_handle_until_closed()   loop on a WorkerPool, dispatch via adapter
//! coro_handle_until_closed().await read on a WorkerPool, dispatch in the task
//! ```
//!
//! ### Shutdown
//! ```text
//! Sender::close / Receiver::close ──► Entry::Close ──► first consumer flips Open → Closed
//!                                                     └─ later calls: Err(Closed)
//! ```
//! Close travels through the channel like any event, so a sender that fires `N` events
//! and then closes has all `N` dispatched first (given no other producer interleaves).
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Dispatch**      | Fire events, connect listeners, run receive loops.           | [`Dispatcher`], [`Sender`], [`Receiver`]  |
//! | **Channel**       | Shared FIFO transport and its entries.                       | [`Channel`], [`QueueChannel`], [`Entry`]  |
//! | **Processes**     | Datagram socket channel shared across processes (Unix).      | `SocketChannel`                           |
//! | **Listeners**     | Callbacks invoked per signal.                                | [`Listener`], [`Args`]                    |
//! | **Scheduling**    | Relocate dispatch onto a target context.                     | [`Schedule`], [`Marshal`], [`TokioHandoff`]|
//! | **Worker pools**  | Run blocking reads off the caller's scheduler.               | [`Offload`], [`WorkerPool`], [`Pending`]  |
//! | **Errors**        | Typed errors for dispatch, channel and workers.              | [`DispatchError`], [`ChannelError`]       |
//! | **Configuration** | Channel capacity and worker settings.                        | [`Config`]                                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] listener _(demo/reference only)_.
//!
//! Internal diagnostics are emitted through `tracing`; install any subscriber to see them.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use sigdispatch::{args, Dispatcher};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let Dispatcher { sender, mut receiver } = Dispatcher::new();
//!
//!     let total = Arc::new(AtomicU64::new(0));
//!     let t = Arc::clone(&total);
//!     receiver.connect("add", move |a| {
//!         let n = a.get(0).and_then(|v| v.as_u64()).ok_or("expected a number")?;
//!         t.fetch_add(n, Ordering::Relaxed);
//!         Ok(())
//!     });
//!
//!     // Producer on a plain thread, consumer in this async task.
//!     std::thread::spawn(move || {
//!         for n in [43, 54, 87] {
//!             sender.fire("add", args![n]).unwrap();
//!         }
//!         sender.close().unwrap();
//!     });
//!
//!     receiver.coro_handle_until_closed().await?;
//!     assert_eq!(total.load(Ordering::Relaxed), 184);
//!     Ok(())
//! }
//! ```
mod channel;
mod config;
mod dispatch;
mod error;
mod listeners;
mod pool;
mod schedule;

// ---- Public re-exports ----

pub use channel::{Args, Channel, Entry, Event, Get, QueueChannel};
#[cfg(unix)]
pub use channel::{SocketChannel, MAX_DATAGRAM};
pub use config::Config;
pub use dispatch::{Dispatcher, Receiver, Sender};
pub use error::{ChannelError, DispatchError, ListenerError, PoolError};
pub use listeners::Listener;
pub use pool::{Offload, Pending, TokioBlocking, WorkerPool};
pub use schedule::{Marshal, MarshalHandle, Schedule, Thunk, TokioHandoff};

/// Re-exported so listeners can name payload values without a direct dependency.
pub use serde_json::Value;

// Optional: expose a simple built-in logger listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogWriter;
