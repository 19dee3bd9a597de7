//! # slirc-wire
//!
//! A Rust library for reading and writing IRC protocol lines with
//! reusable, lazily parsed message records.
//!
//! ## Features
//!
//! - Zero-copy parsing: every field is a view into the received line
//! - Lazy, memoized parse stages, so dispatch on the command alone is cheap
//! - Reusable records for allocation-free read loops
//! - Blocking [`Decoder`] and [`Encoder`] safe to share between threads
//! - Optional Tokio codec for async networking

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use slirc_wire::MessageRecord;
//!
//! let msg = MessageRecord::from_line(":nick!user@host PRIVMSG #channel :Hello!\r\n");
//!
//! // Only the prefix and command are scanned here.
//! if msg.is_command("PRIVMSG") {
//!     assert_eq!(msg.param(0), Some(&b"#channel"[..]));
//!     assert_eq!(msg.trailing()?, Some(&b"Hello!"[..]));
//!     assert_eq!(msg.name(), Some(&b"nick"[..]));
//! }
//! # Ok::<(), slirc_wire::MessageParseError>(())
//! ```
//!
//! ### Creating IRC Messages
//!
//! ```rust
//! use slirc_wire::{Encoder, MessageRecord};
//!
//! let mut msg = MessageRecord::new();
//! msg.set_name("bot");
//! msg.set_command("PRIVMSG");
//! msg.set_parameters(&["#rust"])?;
//! msg.set_trailing("Hello, world!");
//!
//! let encoder = Encoder::new(Vec::new());
//! encoder.encode(&msg)?;
//! assert_eq!(encoder.into_inner(), b":bot PRIVMSG #rust :Hello, world!\r\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod codec;
pub mod decoder;
pub mod encode;
pub mod encoder;
pub mod error;
pub mod message;
pub mod prefix;

#[cfg(feature = "tokio")]
pub use self::codec::MessageCodec;
pub use self::decoder::Decoder;
pub use self::encode::WireEncode;
pub use self::encoder::Encoder;
pub use self::error::{DecodeError, EncodeError, MessageParseError, ProtocolError, Result};
pub use self::message::{MessageRecord, MessageRef, ParseStage, Params, ParamsIter, MAX_PARAMS};
pub use self::prefix::PrefixRef;

/// Default buffer capacity for [`Decoder`] and [`Encoder`].
pub const DEFAULT_BUFFER_SIZE: usize = 1024;
