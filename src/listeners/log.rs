//! # LogWriter: simple event printer
//!
//! A minimal listener that prints the events it is connected to on stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [progress] args=[54] kwargs={}
//! [progress] args=[87] kwargs={"unit":"ms"}
//! ```

use crate::channel::Args;
use crate::error::ListenerError;
use crate::listeners::Listener;

/// Event writer listener.
#[derive(Default)]
pub struct LogWriter {
    label: Option<String>,
}

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self { label: None }
    }

    /// Construct a [`LogWriter`] that prefixes every line with `[label]`.
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    fn line(&self, args: &Args) -> String {
        let positional = serde_json::to_string(&args.positional).unwrap_or_default();
        let keyword = serde_json::to_string(&args.keyword).unwrap_or_default();
        match &self.label {
            Some(label) => format!("[{label}] args={positional} kwargs={keyword}"),
            None => format!("args={positional} kwargs={keyword}"),
        }
    }
}

impl Listener for LogWriter {
    fn on_event(&self, args: &Args) -> Result<(), ListenerError> {
        println!("{}", self.line(args));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
