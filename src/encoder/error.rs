//! Encode errors.

use thiserror::Error;

/// Failures turning a decoded value into typed JSON.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A value outside every category (StopIteration, Ellipsis).
    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),

    /// A dict key JSON object keys cannot represent.
    #[error("keys must be str, int, float, bool or None, not {0}")]
    UnsupportedKey(&'static str),

    /// Two set elements with no natural ordering between them.
    #[error("'<' not supported between instances of '{left}' and '{right}'")]
    Unorderable {
        left: &'static str,
        right: &'static str,
    },

    /// NaN or an infinity under [`NonFinitePolicy::Error`](crate::types::NonFinitePolicy::Error).
    #[error("out of range float value is not JSON compliant: {value}")]
    NonFiniteFloat { value: &'static str },

    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}
