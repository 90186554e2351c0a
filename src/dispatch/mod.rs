//! # Sender, receiver and the dispatcher that pairs them.
//!
//! ```text
//! Dispatcher ──► Sender  ── fire / close ──► Channel
//!           └──► Receiver ◄── get ───────────┘
//!                   └──► Registry[signal] ──► listeners
//! ```

mod dispatcher;
mod receiver;
mod registry;
mod sender;
mod slot;

pub use dispatcher::Dispatcher;
pub use receiver::Receiver;
pub use sender::Sender;
