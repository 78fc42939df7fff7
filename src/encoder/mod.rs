//! Typed JSON encoder.
//!
//! Values plain JSON cannot represent faithfully are wrapped in an
//! [`Envelope`], `{"type": <python type name>, "value": <json>}`, so a reader
//! knows how to reverse the `value` encoding:
//!
//! | category      | types                              | `value`                         |
//! |---------------|------------------------------------|---------------------------------|
//! | sequence      | tuple, list, set, frozenset        | array (sets sorted)             |
//! | mapping       | dict                               | object, keys stringified        |
//! | buffer        | bytes                              | standard base64                 |
//! | complex       | complex                            | `[real, imag]`                  |
//! | code unit     | code                               | object of `co_*` attributes     |
//! | scalar        | str, int, float, bool, None        | passed through                  |
//!
//! Integers outside the 64-bit range and non-finite floats are also wrapped
//! (`int` with a decimal string, `float` with `"nan"`/`"inf"`/`"-inf"`).

use base64::Engine;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde_json::{Map, Number, Value};

mod envelope;
mod error;
mod keys;
mod ordering;

pub use envelope::Envelope;
pub use error::EncodeError;

use crate::marshal::{Code, Obj};
use crate::types::{EncodeConfig, NonFinitePolicy};

type Result<T> = std::result::Result<T, EncodeError>;

/// Value categories, checked in [`Category::ORDER`]; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Sequence,
    Mapping,
    Buffer,
    Complex,
    CodeUnit,
    Scalar,
    Unsupported,
}

impl Category {
    pub const ORDER: [Category; 6] = [
        Category::Sequence,
        Category::Mapping,
        Category::Buffer,
        Category::Complex,
        Category::CodeUnit,
        Category::Scalar,
    ];

    pub fn matches(self, obj: &Obj) -> bool {
        match self {
            Category::Sequence => matches!(
                obj,
                Obj::Tuple(_) | Obj::List(_) | Obj::Set(_) | Obj::FrozenSet(_)
            ),
            Category::Mapping => matches!(obj, Obj::Dict(_)),
            Category::Buffer => matches!(obj, Obj::Bytes(_)),
            Category::Complex => matches!(obj, Obj::Complex(_)),
            Category::CodeUnit => matches!(obj, Obj::Code(_)),
            Category::Scalar => matches!(
                obj,
                Obj::Str(_) | Obj::Int(_) | Obj::Float(_) | Obj::Bool(_) | Obj::None
            ),
            Category::Unsupported => !Self::ORDER.iter().any(|c| c.matches(obj)),
        }
    }

    pub fn of(obj: &Obj) -> Category {
        Self::ORDER
            .into_iter()
            .find(|category| category.matches(obj))
            .unwrap_or(Category::Unsupported)
    }
}

/// Encode `value` as compact typed JSON text.
pub fn encode(value: &Obj, config: &EncodeConfig) -> Result<String> {
    Ok(encode_value(value, config)?.to_string())
}

/// Encode `value` as a typed JSON tree.
pub fn encode_value(value: &Obj, config: &EncodeConfig) -> Result<Value> {
    Encoder { config, depth: 0 }.encode(value)
}

struct Encoder<'a> {
    config: &'a EncodeConfig,
    depth: usize,
}

impl Encoder<'_> {
    fn encode(&mut self, obj: &Obj) -> Result<Value> {
        if self.depth >= self.config.max_depth {
            return Err(EncodeError::RecursionLimitExceeded);
        }
        self.depth += 1;
        let result = self.encode_category(Category::of(obj), obj);
        self.depth -= 1;
        result
    }

    fn encode_category(&mut self, category: Category, obj: &Obj) -> Result<Value> {
        match (category, obj) {
            (Category::Sequence, Obj::Set(items) | Obj::FrozenSet(items)) => {
                let sorted = ordering::sort_natural(items.to_vec())?;
                Ok(wrap(obj, self.encode_all(&sorted)?))
            }
            (Category::Sequence, Obj::Tuple(items) | Obj::List(items)) => {
                Ok(wrap(obj, self.encode_all(items)?))
            }
            (Category::Mapping, Obj::Dict(pairs)) => {
                let mut object = Map::with_capacity(pairs.len());
                for (key, value) in pairs.iter() {
                    let key = keys::stringify_key(key, self.config.non_finite)?;
                    // a repeated key keeps its first position and takes the last value
                    object.insert(key, self.encode(value)?);
                }
                Ok(wrap(obj, Value::Object(object)))
            }
            (Category::Buffer, Obj::Bytes(bytes)) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                Ok(wrap(obj, Value::String(encoded)))
            }
            (Category::Complex, Obj::Complex(c)) => {
                let parts = vec![self.float_component(c.re)?, self.float_component(c.im)?];
                Ok(wrap(obj, Value::Array(parts)))
            }
            (Category::CodeUnit, Obj::Code(code)) => {
                let attributes = self.encode_code(code)?;
                Ok(wrap(obj, Value::Object(attributes)))
            }
            (Category::Scalar, _) => self.encode_scalar(obj),
            _ => Err(EncodeError::UnsupportedType(obj.type_name())),
        }
    }

    fn encode_all(&mut self, items: &[Obj]) -> Result<Value> {
        items
            .iter()
            .map(|item| self.encode(item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn encode_code(&mut self, code: &Code) -> Result<Map<String, Value>> {
        let mut attributes = Map::new();
        for (name, value) in code.attributes() {
            attributes.insert(name.to_string(), self.encode(&value)?);
        }
        Ok(attributes)
    }

    fn encode_scalar(&self, obj: &Obj) -> Result<Value> {
        match obj {
            Obj::Str(s) => Ok(Value::String(s.to_string())),
            Obj::Bool(b) => Ok(Value::Bool(*b)),
            Obj::None => Ok(Value::Null),
            Obj::Int(i) => Ok(encode_int(i)),
            Obj::Float(f) => match Number::from_f64(*f) {
                Some(number) => Ok(Value::Number(number)),
                None => {
                    let sentinel = self.non_finite(*f)?;
                    Ok(Envelope::new("float", sentinel).into_value())
                }
            },
            other => Err(EncodeError::UnsupportedType(other.type_name())),
        }
    }

    fn float_component(&self, f: f64) -> Result<Value> {
        match Number::from_f64(f) {
            Some(number) => Ok(Value::Number(number)),
            None => Ok(Value::from(self.non_finite(f)?)),
        }
    }

    fn non_finite(&self, f: f64) -> Result<&'static str> {
        let sentinel = non_finite_sentinel(f);
        match self.config.non_finite {
            NonFinitePolicy::Sentinel => Ok(sentinel),
            NonFinitePolicy::Error => Err(EncodeError::NonFiniteFloat { value: sentinel }),
        }
    }
}

fn wrap(obj: &Obj, value: Value) -> Value {
    Envelope::new(obj.type_name(), value).into_value()
}

fn encode_int(i: &BigInt) -> Value {
    if let Some(small) = i.to_i64() {
        Value::from(small)
    } else if let Some(large) = i.to_u64() {
        Value::from(large)
    } else {
        Envelope::new("int", i.to_string()).into_value()
    }
}

/// Spelling of NaN and the infinities that Python's `float()` accepts.
pub(crate) fn non_finite_sentinel(f: f64) -> &'static str {
    if f.is_nan() {
        "nan"
    } else if f > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}
