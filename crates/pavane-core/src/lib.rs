//! # Pavane: a native-protocol PulseAudio client
//!
//! A long-lived, reconnecting client for the PulseAudio sound server.
//! It speaks the binary native protocol (version 32) over a Unix-domain
//! socket or TCP and multiplexes request/response exchanges plus
//! server-initiated subscription events over a single connection.
//!
//! Rather than exposing the protocol directly, the API hides it behind
//! sink-level operations: querying and setting the volume, muting,
//! listing and switching audio outputs, and notifications on
//! configuration updates.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use pavane_core::{Client, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pavane_core::ClientError> {
//!     let client = Client::new(Config::default());
//!     client.connect(Duration::from_secs(10));
//!
//!     client.set_volume(0.5).await?;
//!     let updates = client.updates().await?;
//!     while updates.recv().await.is_some() {
//!         println!("volume is now {}", client.volume().await?);
//!     }
//!
//!     client.close();
//!     client.closed().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Per connection attempt, two long-running tasks share the socket: a
//! receiver owning the read half and the multiplexer owning the write
//! half and the pending-request table (see [`client`]). Caller tasks
//! interact only through a bounded submission queue and per-request
//! response slots. The lifecycle reconnects on any error after a caller
//! supplied retry interval.
//!
//! The wire format itself lives in `pavane-proto`; [`cli`] offers a
//! `pactl`-based fallback for hosts where the native socket is not
//! usable.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod outputs;
pub mod transport;
pub mod updates;

mod introspect;
mod volume;
mod wire;

pub use cli::{CliClient, CliSink};
pub use client::{Client, ConnectionState, PROTOCOL_VERSION};
pub use config::Config;
pub use error::ClientError;
pub use outputs::Output;
pub use transport::Scheme;
pub use updates::UpdateStream;
