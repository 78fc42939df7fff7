//! Natural ordering of set elements.
//!
//! Only values Python itself can compare with `<` are ordered: numbers among
//! numbers, `str` among `str`, `bytes` among `bytes`, tuples element-wise.
//! Frozensets compare by their sorted contents.
//!
//! Tuples skip leading elements that are equal under [`python_eq`] before
//! ordering the first pair that differs, so `(None, 1) < (None, 2)` holds
//! even though `None < None` does not.

use num_bigint::BigInt;
use num_traits::FromPrimitive;
use std::cmp::Ordering;

use super::EncodeError;
use crate::marshal::Obj;

type Result<T> = std::result::Result<T, EncodeError>;

enum Number<'a> {
    Int(BigInt),
    BigRef(&'a BigInt),
    Float(f64),
}

impl Number<'_> {
    fn of(obj: &Obj) -> Option<Number<'_>> {
        match obj {
            Obj::Bool(b) => Some(Number::Int(BigInt::from(u8::from(*b)))),
            Obj::Int(i) => Some(Number::BigRef(i)),
            Obj::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<&BigInt> {
        match self {
            Number::Int(i) => Some(i),
            Number::BigRef(i) => Some(i),
            Number::Float(_) => None,
        }
    }

    /// Total order: exact across int and float, `f64::total_cmp` between
    /// floats, so NaN sorts to a fixed end.
    fn compare(&self, other: &Number<'_>) -> Ordering {
        match (self, other) {
            (Number::Float(a), Number::Float(b)) => a.total_cmp(b),
            (Number::Float(f), int) => cmp_int_float(int.as_int(), *f).reverse(),
            (int, Number::Float(f)) => cmp_int_float(int.as_int(), *f),
            (a, b) => a.as_int().cmp(&b.as_int()),
        }
    }

    fn equals(&self, other: &Number<'_>) -> bool {
        match (self, other) {
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Float(f), _) | (_, Number::Float(f)) if f.is_nan() => false,
            _ => self.compare(other) == Ordering::Equal,
        }
    }
}

/// Compare an integer with a float without rounding the integer.
fn cmp_int_float(int: Option<&BigInt>, f: f64) -> Ordering {
    let Some(int) = int else {
        return Ordering::Equal;
    };
    if f.is_nan() {
        // match total_cmp: -NaN below everything, +NaN above
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f.is_infinite() {
        return if f > 0.0 { Ordering::Less } else { Ordering::Greater };
    }
    let floor = f.floor();
    match BigInt::from_f64(floor) {
        Some(floor_int) => match int.cmp(&floor_int) {
            Ordering::Equal if f > floor => Ordering::Less,
            ordering => ordering,
        },
        None => Ordering::Equal,
    }
}

/// Python `==` between two values: exact across numeric types, structural
/// for everything else. NaN is unequal to itself.
pub(crate) fn python_eq(left: &Obj, right: &Obj) -> bool {
    if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
        return a.equals(&b);
    }
    match (left, right) {
        (Obj::None, Obj::None)
        | (Obj::StopIteration, Obj::StopIteration)
        | (Obj::Ellipsis, Obj::Ellipsis) => true,
        (Obj::Complex(a), Obj::Complex(b)) => a == b,
        (Obj::Complex(c), other) | (other, Obj::Complex(c)) => {
            c.im == 0.0
                && Number::of(other).is_some_and(|n| n.equals(&Number::Float(c.re)))
        }
        (Obj::Str(a), Obj::Str(b)) => a == b,
        (Obj::Bytes(a), Obj::Bytes(b)) => a == b,
        (Obj::Tuple(a), Obj::Tuple(b)) | (Obj::List(a), Obj::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| python_eq(x, y))
        }
        (Obj::Set(a) | Obj::FrozenSet(a), Obj::Set(b) | Obj::FrozenSet(b)) => {
            a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| python_eq(x, y)))
        }
        (Obj::Dict(a), Obj::Dict(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| {
                    b.iter()
                        .any(|(k2, v2)| python_eq(k, k2) && python_eq(v, v2))
                })
        }
        (Obj::Code(a), Obj::Code(b)) => a == b,
        _ => false,
    }
}

/// Compare two values the way `sorted()` would, or fail if Python would
/// raise `TypeError`.
pub(crate) fn natural_cmp(left: &Obj, right: &Obj) -> Result<Ordering> {
    if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
        return Ok(a.compare(&b));
    }
    match (left, right) {
        (Obj::Str(a), Obj::Str(b)) => Ok(a.cmp(b)),
        (Obj::Bytes(a), Obj::Bytes(b)) => Ok(a.cmp(b)),
        (Obj::Tuple(a), Obj::Tuple(b)) => cmp_sequences(a, b),
        (Obj::FrozenSet(a), Obj::FrozenSet(b)) => {
            let a = sort_natural(a.to_vec())?;
            let b = sort_natural(b.to_vec())?;
            cmp_sequences(&a, &b)
        }
        _ => Err(EncodeError::Unorderable {
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

fn cmp_sequences(a: &[Obj], b: &[Obj]) -> Result<Ordering> {
    match a.iter().zip(b).find(|(x, y)| !python_eq(x, y)) {
        Some((x, y)) => natural_cmp(x, y),
        None => Ok(a.len().cmp(&b.len())),
    }
}
/// Stable ascending sort that stops at the first incomparable pair.
///
/// `slice::sort_by` cannot report a failed comparison, so this is a plain
/// merge sort. Fewer than two items are returned without comparing.
pub(crate) fn sort_natural(mut items: Vec<Obj>) -> Result<Vec<Obj>> {
    if items.len() < 2 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = sort_natural(items)?;
    let right = sort_natural(right)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let take_right = natural_cmp(r, l)? == Ordering::Less;
        if take_right {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}
