//! # Channel entries.
//!
//! Everything that travels through a [`Channel`](crate::Channel) is an [`Entry`]:
//! either an [`Event`] record or the reserved [`Entry::Close`] marker.
//!
//! ## Rules
//! - An [`Event`] is immutable once enqueued.
//! - The shutdown marker is an enum variant, so no payload can ever be mistaken for it.
//! - All types are `serde`-serializable so a process-spanning channel can carry them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments carried by an [`Event`]: ordered positional values plus named keyword values.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use sigdispatch::Args;
///
/// let args = Args::new().arg(54).kwarg("unit", "ms");
/// assert_eq!(args.get(0), Some(&json!(54)));
/// assert_eq!(args.kw("unit"), Some(&json!("ms")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Args {
    /// Positional values, in call order.
    pub positional: Vec<Value>,
    /// Keyword values.
    pub keyword: BTreeMap<String, Value>,
}

impl Args {
    /// Creates empty arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional value.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword value, replacing any previous value under the same name.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Returns the positional value at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Returns the keyword value named `name`.
    pub fn kw(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }

    /// Returns `true` if there are neither positional nor keyword values.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keyword: BTreeMap::new(),
        }
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// Builds positional [`Args`] from a list of expressions convertible into [`serde_json::Value`].
///
/// ```rust
/// use sigdispatch::args;
///
/// let a = args![43, "x", true];
/// assert_eq!(a.positional.len(), 3);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::new()$(.arg($value))+
    };
}

/// A named event record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Signal name used for listener lookup.
    pub signal: String,
    /// Payload passed to every matching listener.
    pub args: Args,
}

impl Event {
    /// Creates a new event record.
    pub fn new(signal: impl Into<String>, args: impl Into<Args>) -> Self {
        Self {
            signal: signal.into(),
            args: args.into(),
        }
    }
}

/// One item in the channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    /// A user event to dispatch.
    Event(Event),
    /// Shutdown marker: flips the consuming receiver to closed, dispatches nothing.
    Close,
}

impl Entry {
    /// Returns `true` for the shutdown marker.
    #[inline]
    pub fn is_close(&self) -> bool {
        matches!(self, Entry::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn args_macro_keeps_order() {
        let a = args![43, 54, 87];
        assert_eq!(a.positional, vec![json!(43), json!(54), json!(87)]);
        assert!(a.keyword.is_empty());
    }

    #[test]
    fn kwarg_replaces_previous_value() {
        let a = Args::new().kwarg("k", 1).kwarg("k", 2);
        assert_eq!(a.kw("k"), Some(&json!(2)));
        assert_eq!(a.keyword.len(), 1);
    }

    #[test]
    fn close_marker_survives_serialization_and_stays_distinct() {
        let close = serde_json::to_string(&Entry::Close).unwrap();
        let ev = serde_json::to_string(&Entry::Event(Event::new("CLOSE", ()))).unwrap();
        assert_ne!(close, ev);

        let back: Entry = serde_json::from_str(&ev).unwrap();
        assert!(!back.is_close());
        let back: Entry = serde_json::from_str(&close).unwrap();
        assert!(back.is_close());
    }
}
