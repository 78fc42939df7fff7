//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Decoder
//! and encoder failures keep their own enums and are wrapped here so the
//! binary has a single type to report.

use thiserror::Error;

use crate::encoder::EncodeError;
use crate::marshal::DecodeError;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for marshal-json.
#[derive(Error, Debug)]
pub enum Error {
    /// `--format` was given a value other than `plain` or `bytecode`.
    #[error("Unknown format: {0:?}")]
    InvalidFormat(String),

    /// No subcommand, or a subcommand not in the command table.
    #[error("Must specify a valid command to execute: {0}")]
    CommandNotFound(String),

    /// Malformed command line (unknown flag, missing flag value, extra args).
    #[error("{0}")]
    Usage(String),

    /// Malformed configuration value from the environment.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input could not be decoded as a marshal stream.
    #[error("unable to read marshaled input: {0}")]
    Decode(#[from] DecodeError),

    /// A decoded value has no typed JSON representation.
    #[error("unable to encode value: {0}")]
    Encode(#[from] EncodeError),

    /// Malformed JSON config file (`MARSHAL_JSON_CONFIG`).
    #[error("invalid config file: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn invalid_format(format: impl Into<String>) -> Self {
        Self::InvalidFormat(format.into())
    }

    pub fn command_not_found(detail: impl Into<String>) -> Self {
        Self::CommandNotFound(detail.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit code for this error.
    ///
    /// Every failure is a plain non-zero exit; the distinction between
    /// usage problems and conversion failures is carried by the message.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Whether the message belongs on stdout (usage text) rather than stderr.
    pub fn is_usage_listing(&self) -> bool {
        matches!(self, Error::CommandNotFound(_))
    }
}
