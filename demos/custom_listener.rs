//! # Custom Listener Example
//!
//! Shows how to implement a [`Listener`] that keeps its own state, next to the built-in
//! [`LogWriter`], and how a failing listener ends the receive loop.
//!
//! ## Run
//! ```bash
//! cargo run --example custom_listener --features logging
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sigdispatch::{args, Args, Dispatcher, Listener, ListenerError, LogWriter};

struct Stats {
    count: AtomicU64,
    sum: AtomicU64,
}

impl Stats {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
        }
    }

    fn print(&self) {
        println!();
        println!("Stats:");
        println!(" ├─► Events: {}", self.count.load(Ordering::Relaxed));
        println!(" └─► Sum:    {}", self.sum.load(Ordering::Relaxed));
    }
}

struct StatsListener(Arc<Stats>);

impl Listener for StatsListener {
    fn on_event(&self, args: &Args) -> Result<(), ListenerError> {
        let n = args
            .get(0)
            .and_then(|v| v.as_u64())
            .ok_or("expected an unsigned number")?;
        self.0.count.fetch_add(1, Ordering::Relaxed);
        self.0.sum.fetch_add(n, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stats"
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Dispatcher { sender, mut receiver } = Dispatcher::new();
    let stats = Arc::new(Stats::new());

    receiver.connect_listener("value", LogWriter::labeled("value"));
    receiver.connect_listener("value", StatsListener(Arc::clone(&stats)));

    for v in [43, 54, 87] {
        sender.fire("value", args![v])?;
    }
    sender.close()?;
    receiver.handle_until_closed(None)?;
    stats.print();

    // A listener error is not isolated: it ends the loop.
    let Dispatcher { sender, mut receiver } = Dispatcher::new();
    receiver.connect_listener("value", StatsListener(Arc::clone(&stats)));
    sender.fire("value", args!["not a number"])?;
    sender.close()?;
    match receiver.handle_until_closed(None) {
        Err(e) => println!("\nloop ended: [{}] {}", e.as_label(), e.as_message()),
        Ok(()) => println!("\nloop ended normally"),
    }
    Ok(())
}
