//! Dict key stringification.
//!
//! JSON object keys are strings, so scalar keys are rendered the way
//! Python's `json` module renders them.

use super::EncodeError;
use crate::marshal::Obj;
use crate::types::NonFinitePolicy;

pub(crate) fn stringify_key(key: &Obj, non_finite: NonFinitePolicy) -> Result<String, EncodeError> {
    match key {
        Obj::Str(s) => Ok(s.to_string()),
        Obj::Int(i) => Ok(i.to_string()),
        Obj::Float(f) if f.is_finite() => Ok(float_repr(*f)),
        Obj::Float(f) => match non_finite {
            NonFinitePolicy::Sentinel => Ok(json_non_finite(*f).to_string()),
            NonFinitePolicy::Error => Err(EncodeError::NonFiniteFloat {
                value: super::non_finite_sentinel(*f),
            }),
        },
        Obj::Bool(true) => Ok("true".to_string()),
        Obj::Bool(false) => Ok("false".to_string()),
        Obj::None => Ok("null".to_string()),
        other => Err(EncodeError::UnsupportedKey(other.type_name())),
    }
}

fn json_non_finite(f: f64) -> &'static str {
    if f.is_nan() {
        "NaN"
    } else if f > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Python's `repr(float)` for a finite value: shortest round-trip digits,
/// positional between 1e-4 and 1e16, scientific (`1e+16`, `1.5e-05`) outside.
pub(crate) fn float_repr(f: f64) -> String {
    // `{:e}` yields the shortest round-trip digits as `d.ddde<exp>`.
    let sci = format!("{f:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        if exp < 0 {
            let zeros = "0".repeat((-exp - 1) as usize);
            return format!("{sign}0.{zeros}{digits}");
        }
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            let zeros = "0".repeat(int_len - digits.len());
            format!("{sign}{digits}{zeros}.0")
        } else {
            format!("{sign}{}.{}", &digits[..int_len], &digits[int_len..])
        }
    } else {
        let (first, rest) = digits.split_at(1);
        let exp_sign = if exp < 0 { '-' } else { '+' };
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        format!("{sign}{first}{fraction}e{exp_sign}{:02}", exp.unsigned_abs())
    }
}
