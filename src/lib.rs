//! Typed, future-returning access to callback-style Redis clients.
//!
//! Every store command is a method on the [`Commands`] trait. Calling one on a [`Forwarder`]
//! hands the encoded arguments and a completion callback to the wrapped [`Client`] and returns
//! a future that settles with whatever the client reports. Calling one on a [`Batch`] queues
//! the command instead; [`Forwarder::exec`] submits the queue and settles once for all of them.
//!
//! The crate ships two clients: [`tcp::TcpClient`], speaking RESP over a tokio TCP connection,
//! and [`memory::MemoryClient`], an in-process fake backed by an expiring [`store::Store`].

pub mod args;
pub mod batch;
pub mod client;
pub mod codec;
pub mod commands;
pub mod connection;
pub mod descriptor;
pub mod error;
pub mod forwarder;
pub mod frame;
pub mod memory;
pub mod store;
pub mod tcp;

pub use args::{Condition, Expiration, ToArgs};
pub use batch::{Batch, BatchMode, QueuedCommand};
pub use client::{Callback, Client};
pub use commands::{Commands, COMMANDS};
pub use error::Error;
pub use forwarder::{promisify, ForwardError, Forwarder, Pending};
pub use frame::Frame;

pub type Result<T> = std::result::Result<T, Error>;
