//! Decode errors.

use thiserror::Error;

/// Decode error types
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Type byte outside the marshal alphabet (or `?`, "unknown").
    #[error("invalid type code: {code:#04x}")]
    InvalidType { code: u8 },

    /// Nesting deeper than the configured limit.
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// A long digit wider than 15 bits.
    #[error("long digit out of range: {digit:#06x}")]
    DigitOutOfRange { digit: u16 },

    /// A long whose most significant digit is zero.
    #[error("unnormalized long")]
    UnnormalizedLong,

    /// Null marker where a value was required.
    #[error("unexpected null object")]
    UnexpectedNull,

    /// Set element or dict key of a mutable type.
    #[error("unhashable type: '{0}'")]
    Unhashable(&'static str),

    /// A code object field holding the wrong kind of value.
    #[error("{field}: expected {expected}, found {found}")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Back-reference to an unknown slot, or to a container still being read.
    #[error("invalid reference: {index}")]
    InvalidRef { index: u32 },

    /// The bytecode header is not a timestamp-based `.pyc` header.
    #[error("bad bytecode header: {0}")]
    BadHeader(String),

    /// The header magic names a CPython release whose layout is not supported.
    #[error("unsupported bytecode magic number {magic}: {reason}")]
    UnsupportedMagic { magic: u16, reason: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unable to parse float: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}
