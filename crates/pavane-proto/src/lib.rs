//! # Pavane Protocol: Wire Format
//!
//! This crate implements the binary wire format of the PulseAudio native
//! protocol (version 32), as spoken between a client and the sound server
//! over a Unix-domain socket or TCP.
//!
//! ## Protocol Design
//!
//! Every message is a *frame*: a fixed 20-byte descriptor followed by a
//! variable-length body. The body is a *tagstruct* — a sequence of values
//! where each value is prefixed by a single type-tag byte identifying its
//! encoding. All multi-byte integers are Big Endian.
//!
//! - [`Descriptor`]: 20 bytes of raw binary (Big Endian) framing every
//!   message: body length, channel, offsets, flags.
//! - [`tagstruct`]: the self-describing tagged codec used by every body.
//! - [`Command`]: the canonical command-code registry.
//! - [`introspect`]: typed decoders for the server's object dumps (server
//!   info, sinks, modules, cards).
//!
//! ## Implementation Notes
//!
//! - **Zero-Copy Descriptor Parsing**: We use
//!   [`zerocopy`](https://docs.rs/zerocopy) to cast network bytes directly
//!   to [`Descriptor`] structures. All bit patterns are valid, so casting
//!   untrusted bytes cannot cause undefined behavior.
//!
//! - **Type-Checked Decoding**: The tagstruct reader verifies every tag
//!   byte against the caller's expectation and fails with a structured
//!   mismatch error instead of misinterpreting the stream.
//!
//! - **Size Limits**: Frame bodies are capped at 16 MB. Oversized frames
//!   are rejected before any payload memory is allocated.
//!
//! This crate is sans-IO: it never touches a socket. The connection
//! lifecycle and request multiplexing live in `pavane-core`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod descriptor;
pub mod errors;
pub mod frame;
pub mod introspect;
pub mod sample;
pub mod server_error;
pub mod subscription;
pub mod tag;
pub mod tagstruct;

pub use command::Command;
pub use descriptor::Descriptor;
pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use sample::{CVolume, ChannelMap, FormatInfo, SampleSpec, VOLUME_NORM};
pub use server_error::ServerErrorCode;
pub use subscription::SubscriptionMask;
pub use tag::Tag;
pub use tagstruct::{TagStructReader, TagStructWriter, Value};
