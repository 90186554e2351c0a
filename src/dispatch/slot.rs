//! # Hand-over slot for reads that run on a worker.
//!
//! The async receive mode reads on a worker while the calling task is suspended. The
//! task may be dropped at any await point, so the entry is not returned through the
//! worker's result: it is parked in a [`ReadSlot`] shared by both sides.
//!
//! ## State machine
//! ```text
//!   Waiting ──worker stores entry──► Ready ──task takes it──► (dispatched)
//!      │                               │
//!      └──task dropped──► Abandoned ◄──┘ task dropped: entry re-queued
//!                            │
//!                            └─ worker stops before its next read slice;
//!                               an entry it already holds is re-queued
//! ```
//!
//! ## Rules
//! - Every transition happens under one lock, so an entry is either taken by the
//!   task or put back on the channel, never both and never neither.
//! - A worker blocks at most [`READ_SLICE`] between abandonment checks.
//! - A re-queued entry goes to the back of the channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::channel::{Channel, Entry, Get};
use crate::error::ChannelError;

/// Longest single wait of a worker-side read before it rechecks abandonment.
pub(crate) const READ_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug)]
enum SlotState {
    /// The worker is still reading.
    Waiting,
    /// The worker stored an entry the task has not taken yet.
    Ready(Entry),
    /// The task went away.
    Abandoned,
}

/// Shared between the suspended task ([`ReadSlot`]) and the worker ([`SlotReader`]).
struct Shared<C> {
    channel: C,
    state: Mutex<SlotState>,
}

impl<C: Channel> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn requeue(&self, entry: Entry) {
        if let Err(error) = self.channel.put(entry) {
            warn!(error = error.as_label(), "abandoned read could not re-queue its entry");
        } else {
            trace!("abandoned read re-queued its entry");
        }
    }
}

/// Task-side half; dropping it abandons the read.
pub(crate) struct ReadSlot<C: Channel> {
    shared: Arc<Shared<C>>,
}

/// Worker-side half.
pub(crate) struct SlotReader<C: Channel> {
    shared: Arc<Shared<C>>,
}

impl<C: Channel> ReadSlot<C> {
    pub(crate) fn new(channel: C) -> (ReadSlot<C>, SlotReader<C>) {
        let shared = Arc::new(Shared {
            channel,
            state: Mutex::new(SlotState::Waiting),
        });
        (
            ReadSlot {
                shared: Arc::clone(&shared),
            },
            SlotReader { shared },
        )
    }

    /// Takes the entry stored by the worker, if any.
    pub(crate) fn take(&self) -> Option<Entry> {
        let mut state = self.shared.lock();
        match std::mem::replace(&mut *state, SlotState::Waiting) {
            SlotState::Ready(entry) => Some(entry),
            other => {
                *state = other;
                None
            }
        }
    }
}

impl<C: Channel> Drop for ReadSlot<C> {
    fn drop(&mut self) {
        let previous = std::mem::replace(&mut *self.shared.lock(), SlotState::Abandoned);
        if let SlotState::Ready(entry) = previous {
            self.shared.requeue(entry);
        }
    }
}

impl<C: Channel> SlotReader<C> {
    /// Reads one entry as described by `get` and parks it in the slot.
    ///
    /// Returns `Ok(())` also when the task went away; in that case nothing is parked
    /// and any entry read meanwhile is back on the channel.
    pub(crate) fn read(self, get: Get) -> Result<(), ChannelError> {
        let deadline = get.timeout.map(|timeout| (Instant::now() + timeout, timeout));
        loop {
            if matches!(*self.shared.lock(), SlotState::Abandoned) {
                trace!("read abandoned before an entry arrived");
                return Ok(());
            }

            let slice = match (get.block, deadline) {
                (false, _) => Get::non_blocking(),
                (true, None) => Get::timeout(READ_SLICE),
                (true, Some((at, timeout))) => {
                    let left = at.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(ChannelError::Timeout { timeout });
                    }
                    Get::timeout(left.min(READ_SLICE))
                }
            };

            match self.shared.channel.get(slice) {
                Ok(entry) => {
                    self.park(entry);
                    return Ok(());
                }
                Err(ChannelError::Timeout { .. }) if get.block => continue,
                Err(error) => return Err(error),
            }
        }
    }

    fn park(&self, entry: Entry) {
        let mut state = self.shared.lock();
        if matches!(*state, SlotState::Abandoned) {
            drop(state);
            self.shared.requeue(entry);
        } else {
            *state = SlotState::Ready(entry);
        }
    }
}
