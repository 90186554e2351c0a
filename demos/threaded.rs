//! # Example: threaded
//!
//! Shows the thread-bridged receive loop: channel reads block on a worker thread while
//! every listener call is marshaled back to the main thread.
//!
//! ## Flow
//! ```text
//! producer thread ── fire ×5, close ──► Channel
//! worker thread   ── handle_until_closed(adapter) ──► Marshal queue
//! main thread     ── Marshal::run_next() ──► listeners (always on main)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=sigdispatch=debug cargo run --example threaded
//! ```

use std::thread;
use std::time::Duration;

use sigdispatch::{args, Dispatcher, Marshal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Dispatcher { sender, mut receiver } = Dispatcher::new();
    let main_thread = thread::current().id();

    receiver.connect("progress", move |a| {
        assert_eq!(thread::current().id(), main_thread);
        println!("[progress] {}%", a.get(0).cloned().unwrap_or_default());
        Ok(())
    });

    // The main thread plays the role of a UI/event loop: it drains the marshal queue.
    let marshal = Marshal::new();
    let mut done = receiver.threaded_handle_until_closed(marshal.handle(), None)?;

    let producer = thread::spawn(move || -> Result<(), sigdispatch::ChannelError> {
        for pct in [0, 25, 50, 75, 100] {
            sender.fire("progress", args![pct])?;
            thread::sleep(Duration::from_millis(100));
        }
        sender.close()
    });

    loop {
        marshal.run_next(Duration::from_millis(50))?;
        if let Some(outcome) = done.try_take() {
            outcome??;
            break;
        }
    }
    marshal.run_pending()?;

    producer.join().map_err(|_| "producer panicked")??;
    println!("receiver closed: {}", receiver.is_closed());
    Ok(())
}
