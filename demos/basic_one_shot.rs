//! # Example: basic_one_shot
//!
//! Minimal example: one event fired from a worker thread, received once with a timeout.
//!
//! Demonstrates how to:
//! - Split a [`Dispatcher`] into its sending and receiving views.
//! - Connect a listener on the receiving side.
//! - Receive exactly one event with [`Receiver::handle_next`].
//!
//! ## Flow
//! ```text
//! worker thread: Sender::fire("cb", 54) ──► Channel
//! main thread:   Receiver::handle_next(timeout = 2s)
//!                    └─► listener("cb") prints 54
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_one_shot
//! ```

use std::thread;
use std::time::Duration;

use sigdispatch::{args, Dispatcher, Get};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. One channel, two views
    let (sender, mut receiver) = Dispatcher::new().into_parts();

    // 2. Listeners live on the receiving side only
    receiver.connect("cb", |a| {
        println!("[cb] got {:?}", a.get(0));
        Ok(())
    });

    // 3. Fire from another thread
    let worker = thread::spawn(move || sender.fire("cb", args![54]));

    // 4. Wait for exactly one event
    receiver.handle_next(None, Get::timeout(Duration::from_secs(2)))?;
    worker.join().map_err(|_| "worker panicked")??;
    Ok(())
}
