//! Marshal - CPython's internal object serialization format.
//!
//! Decodes a marshal stream into an [`Obj`] graph. The graph is the input of
//! the typed JSON encoder; nothing here knows about JSON.
//!
//! Layout:
//! - [`Obj`]: closed set of values the format can carry
//! - [`code`]: compiled code objects and their attribute table
//! - [`read`]: the stream decoder
//! - [`header`]: the 16-byte timestamp-based `.pyc` header

use num_bigint::BigInt;
use num_complex::Complex64;
use std::sync::Arc;

pub mod code;
mod error;
pub mod header;
pub mod read;

pub use code::{Code, CodeFlags};
pub use error::DecodeError;
pub use header::{BytecodeHeader, HEADER_LEN};
pub use read::{load, loads};

/// A decoded marshal value.
///
/// Containers hold their contents behind `Arc`, so back-references in the
/// stream share structure instead of copying it.
#[derive(Debug, Clone, PartialEq)]
pub enum Obj {
    None,
    StopIteration,
    Ellipsis,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Complex(Complex64),
    Bytes(Arc<[u8]>),
    Str(Arc<str>),
    Tuple(Arc<[Obj]>),
    List(Arc<[Obj]>),
    /// Key/value pairs in stream order.
    Dict(Arc<[(Obj, Obj)]>),
    /// Elements in stream order (unsorted).
    Set(Arc<[Obj]>),
    FrozenSet(Arc<[Obj]>),
    Code(Arc<Code>),
}

impl Obj {
    /// The runtime type's simple name, as Python's `type(x).__name__`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Obj::None => "NoneType",
            // marshal carries the StopIteration class itself
            Obj::StopIteration => "type",
            Obj::Ellipsis => "ellipsis",
            Obj::Bool(_) => "bool",
            Obj::Int(_) => "int",
            Obj::Float(_) => "float",
            Obj::Complex(_) => "complex",
            Obj::Bytes(_) => "bytes",
            Obj::Str(_) => "str",
            Obj::Tuple(_) => "tuple",
            Obj::List(_) => "list",
            Obj::Dict(_) => "dict",
            Obj::Set(_) => "set",
            Obj::FrozenSet(_) => "frozenset",
            Obj::Code(_) => "code",
        }
    }

    /// Whether the value may be a set element or dict key.
    pub fn is_hashable(&self) -> bool {
        match self {
            Obj::List(_) | Obj::Dict(_) | Obj::Set(_) => false,
            Obj::Tuple(items) => items.iter().all(Obj::is_hashable),
            _ => true,
        }
    }

    /// The first unhashable value inside `self`, if any.
    pub(crate) fn find_unhashable(&self) -> Option<&Obj> {
        match self {
            Obj::List(_) | Obj::Dict(_) | Obj::Set(_) => Some(self),
            Obj::Tuple(items) => items.iter().find_map(Obj::find_unhashable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&Arc<str>> {
        match self {
            Obj::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Arc<[u8]>> {
        match self {
            Obj::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Arc<[Obj]>> {
        match self {
            Obj::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&Arc<Code>> {
        match self {
            Obj::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn str(s: &str) -> Self {
        Obj::Str(Arc::from(s))
    }

    pub fn bytes(b: &[u8]) -> Self {
        Obj::Bytes(Arc::from(b))
    }

    pub fn tuple(items: Vec<Obj>) -> Self {
        Obj::Tuple(items.into())
    }

    pub fn list(items: Vec<Obj>) -> Self {
        Obj::List(items.into())
    }

    pub fn set(items: Vec<Obj>) -> Self {
        Obj::Set(items.into())
    }

    pub fn frozenset(items: Vec<Obj>) -> Self {
        Obj::FrozenSet(items.into())
    }

    pub fn dict(pairs: Vec<(Obj, Obj)>) -> Self {
        Obj::Dict(pairs.into())
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Obj::Complex(Complex64::new(re, im))
    }
}

impl From<bool> for Obj {
    fn from(value: bool) -> Self {
        Obj::Bool(value)
    }
}

impl From<i64> for Obj {
    fn from(value: i64) -> Self {
        Obj::Int(BigInt::from(value))
    }
}

impl From<BigInt> for Obj {
    fn from(value: BigInt) -> Self {
        Obj::Int(value)
    }
}

impl From<f64> for Obj {
    fn from(value: f64) -> Self {
        Obj::Float(value)
    }
}

impl From<&str> for Obj {
    fn from(value: &str) -> Self {
        Obj::str(value)
    }
}

impl From<Code> for Obj {
    fn from(value: Code) -> Self {
        Obj::Code(Arc::new(value))
    }
}
