//! # Listener trait.
//!
//! Provides [`Listener`], the callback invoked for every dispatched event whose signal
//! it was connected to.
//!
//! ## Rules
//! - Runs synchronously, in registration order, in whichever context dispatches.
//! - An `Err` aborts the current consumption call; later listeners for the same
//!   event are not invoked.
//! - Closures `Fn(&Args) -> Result<(), ListenerError>` are listeners.
//!
//! ## Example
//! ```rust
//! use sigdispatch::{Args, Listener, ListenerError};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct Counter(AtomicU64);
//!
//! impl Listener for Counter {
//!     fn on_event(&self, _args: &Args) -> Result<(), ListenerError> {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "counter" }
//! }
//! ```

use crate::channel::Args;
use crate::error::ListenerError;

/// Callback invoked with the arguments of a matching event.
pub trait Listener: Send + Sync + 'static {
    /// Handles one event.
    fn on_event(&self, args: &Args) -> Result<(), ListenerError>;

    /// Returns the listener name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Listener for F
where
    F: Fn(&Args) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    fn on_event(&self, args: &Args) -> Result<(), ListenerError> {
        self(args)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}
