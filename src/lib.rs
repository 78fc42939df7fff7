//! # marshal-json - typed JSON views of CPython marshal data
//!
//! Decodes CPython's `marshal` serialization (optionally behind the 16-byte
//! header of a timestamp-based `.pyc`) and renders the result as JSON that
//! keeps the original Python types visible:
//!
//! ```text
//!   bytes ──► marshal::BytecodeHeader::strip ──► marshal::loads ──► Obj ──► encoder::encode ──► JSON
//!             (bytecode input only)
//! ```
//!
//! Types plain JSON would blur are wrapped in `{"type": ..., "value": ...}`
//! envelopes; see [`encoder`] for the full mapping.
//!
//! ```
//! use marshal_json::{encoder, marshal, DecodeConfig, EncodeConfig};
//!
//! let value = marshal::loads(b")\x02\xe9\x01\x00\x00\x00\xda\x01a", &DecodeConfig::default())?;
//! let json = encoder::encode(&value, &EncodeConfig::default())?;
//! assert_eq!(json, r#"{"type":"tuple","value":[1,"a"]}"#);
//! # Ok::<(), marshal_json::Error>(())
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod encoder;
pub mod marshal;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

// Internal utilities
pub mod observability;

pub use encoder::{encode, encode_value, EncodeError};
pub use marshal::{DecodeError, Obj};
pub use types::{Config, DecodeConfig, EncodeConfig, Error, NonFinitePolicy, Result};
