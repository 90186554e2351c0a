//! # Event listeners.
//!
//! This module provides the [`Listener`] trait and, behind the `logging` feature,
//! the built-in [`LogWriter`].
//!
//! ```text
//! Receiver ── dispatch(Event) ──► Registry[event.signal]
//!                                     ├──► listener 1 .on_event(&args)
//!                                     ├──► listener 2 .on_event(&args)
//!                                     └──► ...        (registration order)
//! ```

mod listener;
#[cfg(feature = "logging")]
mod log;

pub use listener::Listener;
#[cfg(feature = "logging")]
pub use log::LogWriter;
