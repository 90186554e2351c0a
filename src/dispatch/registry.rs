//! Listener registry and the dispatch rule.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::channel::Event;
use crate::error::DispatchError;
use crate::listeners::Listener;

/// Signal name → listeners, in registration order.
///
/// Cloning shares the same table; the lock only guards the table itself and is
/// never held while listeners run.
#[derive(Clone, Default)]
pub(crate) struct Registry {
    table: Arc<Mutex<HashMap<String, Vec<Arc<dyn Listener>>>>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Arc<dyn Listener>>>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `listener` to the sequence for `signal`. No de-duplication.
    pub(crate) fn connect(&self, signal: String, listener: Arc<dyn Listener>) {
        trace!(signal = %signal, listener = listener.name(), "listener connected");
        self.lock().entry(signal).or_default().push(listener);
    }

    pub(crate) fn count(&self, signal: &str) -> usize {
        self.lock().get(signal).map_or(0, Vec::len)
    }

    fn snapshot(&self, signal: &str) -> Vec<Arc<dyn Listener>> {
        self.lock().get(signal).cloned().unwrap_or_default()
    }

    /// Invokes every listener of `event.signal` in order; the first error aborts.
    ///
    /// Listeners connected while this runs take effect from the next event.
    pub(crate) fn dispatch(&self, event: &Event) -> Result<(), DispatchError> {
        let listeners = self.snapshot(&event.signal);
        if listeners.is_empty() {
            trace!(signal = %event.signal, "no listeners, event dropped");
            return Ok(());
        }
        for listener in listeners {
            trace!(signal = %event.signal, listener = listener.name(), "dispatching");
            listener
                .on_event(&event.args)
                .map_err(|source| DispatchError::Listener {
                    signal: event.signal.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
