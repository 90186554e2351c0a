//! # Example: coro
//!
//! Shows the cooperative receive loop: the async task is suspended while a worker pool
//! performs the blocking read, and listeners run inside the task itself.
//! A listener stops its own loop by closing the receiver after the last payload.
//!
//! ## Flow
//! ```text
//! tokio task:  coro_handle_until_closed().await
//!                 ├─► WorkerPool: channel.get()  (task suspended)
//!                 └─► listener("cb") inline      (task resumed)
//! listener:    payload == 87 ──► Receiver::close
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example coro
//! ```

use std::time::Duration;

use serde_json::json;
use sigdispatch::{args, Dispatcher};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Dispatcher { sender, mut receiver } = Dispatcher::new();

    let closer = receiver.sender();
    receiver.connect("cb", move |a| {
        println!("[cb] {:?}", a.get(0));
        if a.get(0) == Some(&json!(87)) {
            closer.close()?;
        }
        Ok(())
    });

    // Other work keeps running on the same single-threaded scheduler.
    let ticker = tokio::spawn(async {
        for i in 0..3 {
            println!("[ticker] {i}");
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
    });

    let producer = std::thread::spawn(move || -> Result<(), sigdispatch::ChannelError> {
        for v in [43, 54, 87, 99] {
            std::thread::sleep(Duration::from_millis(20));
            sender.fire("cb", args![v])?;
        }
        Ok(())
    });

    receiver.coro_handle_until_closed().await?;
    ticker.await?;
    producer.join().map_err(|_| "producer panicked")??;
    println!("closed; 99 was never dispatched");
    Ok(())
}
