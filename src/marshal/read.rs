//! Marshal stream decoder.
//!
//! Stream format: one type byte per object, optionally OR-ed with `0x80` to
//! ask the reader to remember the object for later `r` back-references.
//! All integers are little-endian.
//!
//! Containers flagged for reference reserve their slot before their contents
//! are read. A back-reference to a slot that is still reserved is rejected,
//! so decoded graphs never contain cycles.

use byteorder::{LittleEndian, ReadBytesExt};
use num_bigint::{BigInt, BigUint, Sign};
use num_complex::Complex64;
use num_traits::Zero;
use std::io::{self, Read};
use std::sync::Arc;

use super::code::{Code, CodeFlags};
use super::{DecodeError, Obj};
use crate::types::DecodeConfig;

type Result<T> = std::result::Result<T, DecodeError>;

const FLAG_REF: u8 = 0x80;

/// Upper bound on speculative allocation from a length prefix.
const PREALLOC_LIMIT: usize = 4096;

/// Bits per digit of a marshalled long.
const LONG_DIGIT_BITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeCode {
    Null,
    None,
    False,
    True,
    StopIter,
    Ellipsis,
    Int,
    Int64,
    Float,
    BinaryFloat,
    Complex,
    BinaryComplex,
    Long,
    String,
    Interned,
    Ref,
    Tuple,
    List,
    Dict,
    Code,
    Unicode,
    Set,
    FrozenSet,
    Ascii,
    AsciiInterned,
    SmallTuple,
    ShortAscii,
    ShortAsciiInterned,
}

impl TypeCode {
    fn from_u8(code: u8) -> Option<Self> {
        let kind = match code {
            b'0' => TypeCode::Null,
            b'N' => TypeCode::None,
            b'F' => TypeCode::False,
            b'T' => TypeCode::True,
            b'S' => TypeCode::StopIter,
            b'.' => TypeCode::Ellipsis,
            b'i' => TypeCode::Int,
            b'I' => TypeCode::Int64,
            b'f' => TypeCode::Float,
            b'g' => TypeCode::BinaryFloat,
            b'x' => TypeCode::Complex,
            b'y' => TypeCode::BinaryComplex,
            b'l' => TypeCode::Long,
            b's' => TypeCode::String,
            b't' => TypeCode::Interned,
            b'r' => TypeCode::Ref,
            b'(' => TypeCode::Tuple,
            b'[' => TypeCode::List,
            b'{' => TypeCode::Dict,
            b'c' => TypeCode::Code,
            b'u' => TypeCode::Unicode,
            b'<' => TypeCode::Set,
            b'>' => TypeCode::FrozenSet,
            b'a' => TypeCode::Ascii,
            b'A' => TypeCode::AsciiInterned,
            b')' => TypeCode::SmallTuple,
            b'z' => TypeCode::ShortAscii,
            b'Z' => TypeCode::ShortAsciiInterned,
            // includes b'?' (TYPE_UNKNOWN)
            _ => return None,
        };
        Some(kind)
    }

    /// Containers take their reference slot before reading their contents.
    fn reserves_ref(self) -> bool {
        matches!(
            self,
            TypeCode::Tuple
                | TypeCode::SmallTuple
                | TypeCode::List
                | TypeCode::Dict
                | TypeCode::Set
                | TypeCode::FrozenSet
                | TypeCode::Code
        )
    }
}

struct Reader<R> {
    inner: R,
    /// `None` marks a slot reserved by a container still being decoded.
    refs: Vec<Option<Obj>>,
    depth: usize,
    config: DecodeConfig,
}

impl<R: Read> Reader<R> {
    fn new(inner: R, config: DecodeConfig) -> Self {
        Self {
            inner,
            refs: Vec::new(),
            depth: 0,
            config,
        }
    }

    /// Read one object; `Ok(None)` is the null marker that ends a dict.
    fn read_object(&mut self) -> Result<Option<Obj>> {
        let byte = self.inner.read_u8()?;
        let flag = byte & FLAG_REF != 0;
        let code = byte & !FLAG_REF;
        let kind = TypeCode::from_u8(code).ok_or(DecodeError::InvalidType { code })?;

        if self.depth >= self.config.max_depth {
            return Err(DecodeError::RecursionLimitExceeded);
        }
        self.depth += 1;
        let result = self.read_body(kind, flag);
        self.depth -= 1;
        result
    }

    fn read_object_not_null(&mut self) -> Result<Obj> {
        self.read_object()?.ok_or(DecodeError::UnexpectedNull)
    }

    fn read_body(&mut self, kind: TypeCode, flag: bool) -> Result<Option<Obj>> {
        let reserved = if flag && kind.reserves_ref() {
            self.refs.push(None);
            Some(self.refs.len() - 1)
        } else {
            None
        };

        let obj = match kind {
            TypeCode::Null => return Ok(None),
            TypeCode::Ref => return self.read_ref().map(Some),
            TypeCode::None => Obj::None,
            TypeCode::StopIter => Obj::StopIteration,
            TypeCode::Ellipsis => Obj::Ellipsis,
            TypeCode::False => Obj::Bool(false),
            TypeCode::True => Obj::Bool(true),
            TypeCode::Int => Obj::Int(BigInt::from(self.inner.read_i32::<LittleEndian>()?)),
            TypeCode::Int64 => Obj::Int(BigInt::from(self.inner.read_i64::<LittleEndian>()?)),
            TypeCode::Long => Obj::Int(self.read_long()?),
            TypeCode::Float => Obj::Float(self.read_float_str()?),
            TypeCode::BinaryFloat => Obj::Float(self.inner.read_f64::<LittleEndian>()?),
            TypeCode::Complex => {
                let re = self.read_float_str()?;
                let im = self.read_float_str()?;
                Obj::Complex(Complex64::new(re, im))
            }
            TypeCode::BinaryComplex => {
                let re = self.inner.read_f64::<LittleEndian>()?;
                let im = self.inner.read_f64::<LittleEndian>()?;
                Obj::Complex(Complex64::new(re, im))
            }
            TypeCode::String => {
                let len = self.read_len()?;
                Obj::Bytes(self.read_bytes(len)?.into())
            }
            TypeCode::Interned | TypeCode::Unicode | TypeCode::Ascii | TypeCode::AsciiInterned => {
                let len = self.read_len()?;
                Obj::Str(self.read_str(len)?)
            }
            TypeCode::ShortAscii | TypeCode::ShortAsciiInterned => {
                let len = usize::from(self.inner.read_u8()?);
                Obj::Str(self.read_str(len)?)
            }
            TypeCode::SmallTuple => {
                let len = usize::from(self.inner.read_u8()?);
                Obj::Tuple(self.read_objects(len)?.into())
            }
            TypeCode::Tuple => {
                let len = self.read_len()?;
                Obj::Tuple(self.read_objects(len)?.into())
            }
            TypeCode::List => {
                let len = self.read_len()?;
                Obj::List(self.read_objects(len)?.into())
            }
            TypeCode::Dict => Obj::Dict(self.read_dict()?.into()),
            TypeCode::Set => {
                let len = self.read_len()?;
                Obj::Set(self.read_set(len)?.into())
            }
            TypeCode::FrozenSet => {
                let len = self.read_len()?;
                Obj::FrozenSet(self.read_set(len)?.into())
            }
            TypeCode::Code => Obj::Code(Arc::new(self.read_code()?)),
        };

        match reserved {
            Some(index) => {
                if let Some(slot) = self.refs.get_mut(index) {
                    *slot = Some(obj.clone());
                }
            }
            None if flag => self.refs.push(Some(obj.clone())),
            None => {}
        }
        Ok(Some(obj))
    }

    fn read_ref(&mut self) -> Result<Obj> {
        let index = self.inner.read_u32::<LittleEndian>()?;
        match usize::try_from(index).ok().and_then(|i| self.refs.get(i)) {
            Some(Some(obj)) => Ok(obj.clone()),
            _ => Err(DecodeError::InvalidRef { index }),
        }
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = self.inner.read_u32::<LittleEndian>()?;
        usize::try_from(len).map_err(|_| {
            DecodeError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("length {len} exceeds address space"),
            ))
        })
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(buf)
    }

    fn read_str(&mut self, len: usize) -> Result<Arc<str>> {
        let buf = self.read_bytes(len)?;
        Ok(Arc::from(std::str::from_utf8(&buf)?))
    }

    fn read_float_str(&mut self) -> Result<f64> {
        let len = usize::from(self.inner.read_u8()?);
        let buf = self.read_bytes(len)?;
        Ok(std::str::from_utf8(&buf)?.parse()?)
    }

    /// Sign-magnitude base 2**15, least significant digit first.
    fn read_long(&mut self) -> Result<BigInt> {
        let n = self.inner.read_i32::<LittleEndian>()?;
        let size = n.unsigned_abs() as usize;
        let mut digits = Vec::with_capacity(size.min(PREALLOC_LIMIT));
        for _ in 0..size {
            let digit = self.inner.read_u16::<LittleEndian>()?;
            if usize::from(digit) >> LONG_DIGIT_BITS != 0 {
                return Err(DecodeError::DigitOutOfRange { digit });
            }
            digits.push(digit);
        }
        if digits.last() == Some(&0) {
            return Err(DecodeError::UnnormalizedLong);
        }

        let magnitude = digits.iter().rev().fold(BigUint::zero(), |acc, &digit| {
            (acc << LONG_DIGIT_BITS) | BigUint::from(digit)
        });
        let sign = match n {
            0 => Sign::NoSign,
            n if n < 0 => Sign::Minus,
            _ => Sign::Plus,
        };
        Ok(BigInt::from_biguint(sign, magnitude))
    }

    fn read_objects(&mut self, len: usize) -> Result<Vec<Obj>> {
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            items.push(self.read_object_not_null()?);
        }
        Ok(items)
    }

    fn read_dict(&mut self) -> Result<Vec<(Obj, Obj)>> {
        let mut pairs = Vec::new();
        while let Some(key) = self.read_object()? {
            ensure_hashable(&key)?;
            match self.read_object()? {
                Some(value) => pairs.push((key, value)),
                None => break,
            }
        }
        Ok(pairs)
    }

    fn read_set(&mut self, len: usize) -> Result<Vec<Obj>> {
        let items = self.read_objects(len)?;
        for item in &items {
            ensure_hashable(item)?;
        }
        Ok(items)
    }

    fn read_u32_field(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    fn read_code(&mut self) -> Result<Code> {
        let argcount = self.read_u32_field()?;
        let posonlyargcount = if self.config.has_posonlyargcount {
            Some(self.read_u32_field()?)
        } else {
            None
        };
        let kwonlyargcount = self.read_u32_field()?;
        let nlocals = self.read_u32_field()?;
        let stacksize = self.read_u32_field()?;
        let flags = CodeFlags::from_bits_retain(self.read_u32_field()?);
        let code = self.read_bytes_field("co_code")?;
        let consts = self.read_tuple_field("co_consts")?;
        let names = self.read_names_field("co_names")?;
        let varnames = self.read_names_field("co_varnames")?;
        let freevars = self.read_names_field("co_freevars")?;
        let cellvars = self.read_names_field("co_cellvars")?;
        let filename = self.read_str_field("co_filename")?;
        let name = self.read_str_field("co_name")?;
        let firstlineno = self.read_u32_field()?;
        let lnotab = self.read_bytes_field("co_lnotab")?;

        tracing::trace!(name = %name, filename = %filename, firstlineno, "decoded code object");

        Ok(Code {
            argcount,
            posonlyargcount,
            kwonlyargcount,
            nlocals,
            stacksize,
            flags,
            code,
            consts,
            names,
            varnames,
            freevars,
            cellvars,
            filename,
            name,
            firstlineno,
            lnotab,
        })
    }

    fn read_bytes_field(&mut self, field: &'static str) -> Result<Arc<[u8]>> {
        let obj = self.read_object_not_null()?;
        obj.as_bytes()
            .cloned()
            .ok_or_else(|| unexpected(field, "bytes", &obj))
    }

    fn read_str_field(&mut self, field: &'static str) -> Result<Arc<str>> {
        let obj = self.read_object_not_null()?;
        obj.as_str()
            .cloned()
            .ok_or_else(|| unexpected(field, "str", &obj))
    }

    fn read_tuple_field(&mut self, field: &'static str) -> Result<Arc<[Obj]>> {
        let obj = self.read_object_not_null()?;
        obj.as_tuple()
            .cloned()
            .ok_or_else(|| unexpected(field, "tuple", &obj))
    }

    fn read_names_field(&mut self, field: &'static str) -> Result<Arc<[Arc<str>]>> {
        let items = self.read_tuple_field(field)?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .cloned()
                    .ok_or_else(|| unexpected(field, "tuple of str", item))
            })
            .collect()
    }
}

fn unexpected(field: &'static str, expected: &'static str, found: &Obj) -> DecodeError {
    DecodeError::UnexpectedType {
        field,
        expected,
        found: found.type_name(),
    }
}

fn ensure_hashable(obj: &Obj) -> Result<()> {
    match obj.find_unhashable() {
        Some(inner) => Err(DecodeError::Unhashable(inner.type_name())),
        None => Ok(()),
    }
}

/// Decode one object from `reader`. Bytes after the object are left unread.
pub fn load<R: Read>(reader: R, config: &DecodeConfig) -> Result<Obj> {
    let mut reader = Reader::new(reader, *config);
    let obj = reader.read_object_not_null()?;
    tracing::debug!(
        type_name = obj.type_name(),
        refs = reader.refs.len(),
        "decoded marshal object"
    );
    Ok(obj)
}

/// Decode one object from a byte slice. Trailing bytes are ignored.
pub fn loads(bytes: &[u8], config: &DecodeConfig) -> Result<Obj> {
    load(bytes, config)
}

// Vectors from CPython's Lib/test/test_marshal.py
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn loads_default(bytes: &[u8]) -> Obj {
        loads(bytes, &DecodeConfig::default()).unwrap()
    }

    fn loads_37(bytes: &[u8]) -> Obj {
        let config = DecodeConfig {
            has_posonlyargcount: false,
            ..DecodeConfig::default()
        };
        loads(bytes, &config).unwrap()
    }

    fn dict_get<'a>(pairs: &'a [(Obj, Obj)], key: &str) -> &'a Obj {
        pairs
            .iter()
            .find(|(k, _)| k.as_str().map(|s| &**s) == Some(key))
            .map(|(_, v)| v)
            .unwrap()
    }

    fn int(obj: &Obj) -> BigInt {
        match obj {
            Obj::Int(value) => value.clone(),
            other => panic!("expected int, got {other:?}"),
        }
    }

    #[test]
    fn test_ints() {
        let obj = loads_default(b"l\t\x00\x00\x00\x01\x00\x00\x00\x00\x00\x00\x00\xf0\x7f\xff\x7f\xff\x7f\xff\x7f?\x00");
        assert_eq!(
            int(&obj),
            BigInt::parse_bytes(b"85070591730234615847396907784232501249", 10).unwrap()
        );
    }

    #[test]
    fn test_negative_long() {
        // -(2**15 + 1)
        let obj = loads_default(b"l\xfe\xff\xff\xff\x01\x00\x01\x00");
        assert_eq!(int(&obj), BigInt::from(-32769));
        assert_eq!(int(&loads_default(b"l\x00\x00\x00\x00")), BigInt::zero());
    }

    #[allow(clippy::unreadable_literal)]
    #[test]
    fn test_int64() {
        for mut base in [i64::MAX, i64::MIN, -i64::MAX, -(i64::MIN >> 1)] {
            while base != 0 {
                let mut s = vec![b'I'];
                s.extend_from_slice(&base.to_le_bytes());
                assert_eq!(int(&loads_default(&s)), BigInt::from(base));
                if base == -1 {
                    base = 0;
                } else {
                    base >>= 1;
                }
            }
        }

        assert_eq!(
            int(&loads_default(b"I\xfe\xdc\xba\x98\x76\x54\x32\x10")),
            BigInt::from(0x1032547698badcfe_i64)
        );
        assert_eq!(
            int(&loads_default(b"I\x01\x23\x45\x67\x89\xab\xcd\xef")),
            BigInt::from(-0x1032547698badcff_i64)
        );
    }

    #[test]
    fn test_int32() {
        assert_eq!(int(&loads_default(b"i\xff\xff\xff\xff")), BigInt::from(-1));
        assert_eq!(int(&loads_default(b"\xe9\x00\x00\x10\x00")), BigInt::from(1 << 20));
    }

    #[test]
    fn test_bool_and_singletons() {
        assert_eq!(loads_default(b"T"), Obj::Bool(true));
        assert_eq!(loads_default(b"F"), Obj::Bool(false));
        assert_eq!(loads_default(b"N"), Obj::None);
        assert_eq!(loads_default(b"S"), Obj::StopIteration);
        assert_eq!(loads_default(b"."), Obj::Ellipsis);
    }

    #[allow(clippy::float_cmp, clippy::cast_precision_loss)]
    #[test]
    fn test_floats() {
        assert_eq!(
            loads_default(b"g\x11\x9f6\x98\xd2\xab\xe4w"),
            Obj::Float((i64::MAX as f64) * 3.7e250)
        );
        assert_eq!(loads_default(b"f\x041.25"), Obj::Float(1.25));
        match loads_default(b"f\x03nan") {
            Obj::Float(value) => assert!(value.is_nan()),
            other => panic!("expected float, got {other:?}"),
        }
        assert_eq!(loads_default(b"f\x04-inf"), Obj::Float(f64::NEG_INFINITY));
    }

    #[test]
    fn test_complex() {
        assert_eq!(
            loads_default(b"x\x031.5\x04-2.0"),
            Obj::complex(1.5, -2.0)
        );
        let mut binary = vec![b'y'];
        binary.extend_from_slice(&0.5f64.to_le_bytes());
        binary.extend_from_slice(&3.0f64.to_le_bytes());
        assert_eq!(loads_default(&binary), Obj::complex(0.5, 3.0));
    }

    #[test]
    fn test_unicode() {
        assert_eq!(loads_default(b"\xda\x00"), Obj::str(""));
        assert_eq!(
            loads_default(b"u\r\x00\x00\x00Andr\xc3\xa8 Previn"),
            Obj::str("Andr\u{e8} Previn")
        );
        assert_eq!(loads_default(b"\xda\x03abc"), Obj::str("abc"));
        assert_eq!(
            loads_default(&[b"a\x10'\x00\x00" as &[u8], &[b' '; 10_000]].concat()),
            Obj::str(&" ".repeat(10_000))
        );
        assert_eq!(
            loads_default(b"\xf5\r\x00\x00\x00Andr\xc3\xa8 Previn"),
            Obj::str("Andr\u{e8} Previn")
        );
        assert_eq!(loads_default(b"t\x02\x00\x00\x00hi"), Obj::str("hi"));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = loads(b"u\x01\x00\x00\x00\xff", &DecodeConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)), "{err}");
    }

    #[test]
    fn test_bytes() {
        assert_eq!(loads_default(b"\xf3\x00\x00\x00\x00"), Obj::bytes(b""));
        assert_eq!(
            loads_default(b"\xf3\x0c\x00\x00\x00Andr\xe8 Previn"),
            Obj::bytes(b"Andr\xe8 Previn")
        );
        assert_eq!(
            loads_default(&[b"\xf3\x10'\x00\x00" as &[u8], &[b' '; 10_000]].concat()),
            Obj::bytes(&[b' '; 10_000])
        );
    }

    #[test]
    fn test_list_and_tuple() {
        assert_eq!(
            loads_default(b"[\x02\x00\x00\x00\xe9\x01\x00\x00\x00\xda\x01a"),
            Obj::list(vec![Obj::from(1), Obj::str("a")])
        );
        assert_eq!(
            loads_default(b")\x02NT"),
            Obj::tuple(vec![Obj::None, Obj::Bool(true)])
        );
        assert_eq!(
            loads_default(b"(\x01\x00\x00\x00F"),
            Obj::tuple(vec![Obj::Bool(false)])
        );
    }

    fn assert_test_exceptions_code_valid(code: &Code) {
        assert_eq!(code.argcount, 1);
        assert_eq!(code.posonlyargcount, None);
        assert!(code.cellvars.is_empty());
        assert_eq!(&*code.code, b"t\x00\xa0\x01t\x00\xa0\x02t\x03\xa1\x01\xa1\x01}\x01|\x00\xa0\x04t\x03|\x01\xa1\x02\x01\x00d\x00S\x00");
        assert_eq!(&*code.consts, &[Obj::None]);
        assert_eq!(&*code.filename, "<string>");
        assert_eq!(code.firstlineno, 3);
        assert_eq!(
            code.flags,
            CodeFlags::NOFREE | CodeFlags::NEWLOCALS | CodeFlags::OPTIMIZED
        );
        assert!(code.freevars.is_empty());
        assert_eq!(code.kwonlyargcount, 0);
        assert_eq!(&*code.lnotab, b"\x00\x01\x10\x01");
        assert_eq!(&*code.name, "test_exceptions");
        let names: Vec<&str> = code.names.iter().map(|n| &**n).collect();
        assert_eq!(
            names,
            vec!["marshal", "loads", "dumps", "StopIteration", "assertEqual"]
        );
        assert_eq!(code.nlocals, 2);
        assert_eq!(code.stacksize, 5);
        let varnames: Vec<&str> = code.varnames.iter().map(|n| &**n).collect();
        assert_eq!(varnames, vec!["self", "new"]);
    }

    const TEST_EXCEPTIONS_CODE: &[u8] = b"\xe3\x01\x00\x00\x00\x00\x00\x00\x00\x02\x00\x00\x00\x05\x00\x00\x00C\x00\x00\x00s \x00\x00\x00t\x00\xa0\x01t\x00\xa0\x02t\x03\xa1\x01\xa1\x01}\x01|\x00\xa0\x04t\x03|\x01\xa1\x02\x01\x00d\x00S\x00)\x01N)\x05\xda\x07marshal\xda\x05loads\xda\x05dumps\xda\rStopIteration\xda\x0bassertEqual)\x02\xda\x04self\xda\x03new\xa9\x00r\x08\x00\x00\x00\xda\x08<string>\xda\x0ftest_exceptions\x03\x00\x00\x00s\x04\x00\x00\x00\x00\x01\x10\x01";

    #[test]
    fn test_code() {
        let obj = loads_37(TEST_EXCEPTIONS_CODE);
        assert_test_exceptions_code_valid(obj.as_code().unwrap());
    }

    #[test]
    fn test_code_with_wrong_layout_fails() {
        // Reading a 3.7 stream as 3.8 shifts every field by one word.
        assert!(loads(TEST_EXCEPTIONS_CODE, &DecodeConfig::default()).is_err());
    }

    #[test]
    fn test_many_codeobjects() {
        let input = [
            b"(\x88\x13\x00\x00" as &[u8],
            TEST_EXCEPTIONS_CODE,
            &b"r\x00\x00\x00\x00".repeat(4999)[..],
        ]
        .concat();
        let obj = loads_37(&input);
        let tuple = obj.as_tuple().unwrap();
        assert_eq!(tuple.len(), 5000);
        let first = tuple[0].as_code().unwrap();
        for item in tuple.iter() {
            let code = item.as_code().unwrap();
            assert!(Arc::ptr_eq(first, code));
        }
        assert_test_exceptions_code_valid(first);
    }

    #[test]
    fn test_different_filenames() {
        let obj = loads_37(b")\x02c\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01\x00\x00\x00@\x00\x00\x00s\x08\x00\x00\x00e\x00\x01\x00d\x00S\x00)\x01N)\x01\xda\x01x\xa9\x00r\x01\x00\x00\x00r\x01\x00\x00\x00\xda\x02f1\xda\x08<module>\x01\x00\x00\x00\xf3\x00\x00\x00\x00c\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01\x00\x00\x00@\x00\x00\x00s\x08\x00\x00\x00e\x00\x01\x00d\x00S\x00)\x01N)\x01\xda\x01yr\x01\x00\x00\x00r\x01\x00\x00\x00r\x01\x00\x00\x00\xda\x02f2r\x03\x00\x00\x00\x01\x00\x00\x00r\x04\x00\x00\x00");
        let tuple = obj.as_tuple().unwrap();
        assert_eq!(tuple.len(), 2);
        assert_eq!(&*tuple[0].as_code().unwrap().filename, "f1");
        assert_eq!(&*tuple[1].as_code().unwrap().filename, "f2");
        assert_eq!(&*tuple[1].as_code().unwrap().name, "<module>");
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn test_dict() {
        let obj = loads_default(b"{\xda\x07astring\xfa\x10foo@bar.baz.spam\xda\x06afloat\xe7H\xe1z\x14ns\xbc@\xda\x05anint\xe9\x00\x00\x10\x00\xda\nashortlong\xe9\x02\x00\x00\x00\xda\x05alist[\x01\x00\x00\x00\xfa\x07.zyx.41\xda\x06atuple\xa9\n\xfa\x07.zyx.41r\x0c\x00\x00\x00r\x0c\x00\x00\x00r\x0c\x00\x00\x00r\x0c\x00\x00\x00r\x0c\x00\x00\x00r\x0c\x00\x00\x00r\x0c\x00\x00\x00r\x0c\x00\x00\x00r\x0c\x00\x00\x00\xda\x08abooleanF\xda\x08aunicode\xf5\r\x00\x00\x00Andr\xc3\xa8 Previn0");
        let Obj::Dict(pairs) = obj else {
            panic!("expected dict");
        };
        assert_eq!(pairs.len(), 8);

        let keys: Vec<&str> = pairs.iter().map(|(k, _)| &**k.as_str().unwrap()).collect();
        assert_eq!(
            keys,
            vec!["astring", "afloat", "anint", "ashortlong", "alist", "atuple", "aboolean", "aunicode"]
        );
        assert_eq!(dict_get(&pairs, "astring"), &Obj::str("foo@bar.baz.spam"));
        assert_eq!(dict_get(&pairs, "afloat"), &Obj::Float(7283.43));
        assert_eq!(int(dict_get(&pairs, "anint")), BigInt::from(1 << 20));
        assert_eq!(int(dict_get(&pairs, "ashortlong")), BigInt::from(2));
        assert_eq!(
            dict_get(&pairs, "alist"),
            &Obj::list(vec![Obj::str(".zyx.41")])
        );
        assert_eq!(
            dict_get(&pairs, "atuple"),
            &Obj::tuple(vec![Obj::str(".zyx.41"); 10])
        );
        assert_eq!(dict_get(&pairs, "aboolean"), &Obj::Bool(false));
        assert_eq!(dict_get(&pairs, "aunicode"), &Obj::str("Andr\u{e8} Previn"));
    }

    #[test]
    fn test_dict_tuple_key() {
        let obj = loads_default(b"{\xa9\x02\xda\x01a\xda\x01b\xda\x01c0");
        assert_eq!(
            obj,
            Obj::dict(vec![(
                Obj::tuple(vec![Obj::str("a"), Obj::str("b")]),
                Obj::str("c")
            )])
        );
    }

    #[test]
    fn test_unhashable_dict_key_rejected() {
        let err = loads(b"{[\x00\x00\x00\x00N0", &DecodeConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::Unhashable("list")), "{err}");
    }

    #[test]
    fn test_sets() {
        let expected: HashSet<&str> = [
            "alist", "aboolean", "astring", "aunicode", "afloat", "anint", "atuple", "ashortlong",
        ]
        .into_iter()
        .collect();

        let set = loads_default(b"<\x08\x00\x00\x00\xda\x05alist\xda\x08aboolean\xda\x07astring\xda\x08aunicode\xda\x06afloat\xda\x05anint\xda\x06atuple\xda\nashortlong");
        let Obj::Set(items) = set else {
            panic!("expected set");
        };
        let got: HashSet<&str> = items.iter().map(|o| &**o.as_str().unwrap()).collect();
        assert_eq!(got, expected);

        let frozenset = loads_default(b">\x08\x00\x00\x00\xda\x06atuple\xda\x08aunicode\xda\x05anint\xda\x08aboolean\xda\x06afloat\xda\x05alist\xda\nashortlong\xda\x07astring");
        let Obj::FrozenSet(items) = frozenset else {
            panic!("expected frozenset");
        };
        let got: HashSet<&str> = items.iter().map(|o| &**o.as_str().unwrap()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_set_of_lists_rejected() {
        let err = loads(b"<\x01\x00\x00\x00[\x00\x00\x00\x00", &DecodeConfig::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::Unhashable("list")), "{err}");
    }

    #[test]
    fn test_patch_873224() {
        assert!(matches!(
            loads(b"0", &DecodeConfig::default()).unwrap_err(),
            DecodeError::UnexpectedNull
        ));
        for truncated in [
            &b"f"[..],
            &b"l\x05\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00 "[..],
            &b"s\x05\x00\x00\x00abc"[..],
            &b"(\x02\x00\x00\x00N"[..],
            &b""[..],
        ] {
            match loads(truncated, &DecodeConfig::default()).unwrap_err() {
                DecodeError::Io(err) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
                other => panic!("expected EOF for {truncated:?}, got {other}"),
            }
        }
    }

    #[test]
    fn test_fuzz_single_bytes_never_panic() {
        for byte in 0..=u8::MAX {
            let _ = loads(&[byte], &DecodeConfig::default());
        }
    }

    #[test]
    fn test_unknown_type_code() {
        let err = loads(b"?", &DecodeConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { code: b'?' }), "{err}");
        let err = loads(b"\xbf", &DecodeConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { code: b'?' }), "{err}");
    }

    fn nested(prefix: &[u8], depth: usize, suffix: &[u8]) -> Vec<u8> {
        [&prefix.repeat(depth)[..], b"N", suffix].concat()
    }

    #[test]
    fn test_loads_recursion() {
        // Deep nesting needs more stack than the default test thread has.
        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let config = DecodeConfig::default();
                for prefix in [&b")\x01"[..], b"(\x01\x00\x00\x00", b"[\x01\x00\x00\x00", b">\x01\x00\x00\x00"] {
                    assert!(loads(&nested(prefix, 100, b""), &config).is_ok());
                    assert!(matches!(
                        loads(&nested(prefix, 10_000, b""), &config).unwrap_err(),
                        DecodeError::RecursionLimitExceeded
                    ));
                }
                assert!(loads(&nested(b"{N", 100, &b"0".repeat(100)), &config).is_ok());
                assert!(matches!(
                    loads(&nested(b"{N", 10_000, &b"0".repeat(10_000)), &config).unwrap_err(),
                    DecodeError::RecursionLimitExceeded
                ));
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_configured_depth_limit() {
        let config = DecodeConfig {
            max_depth: 3,
            ..DecodeConfig::default()
        };
        assert!(loads(&nested(b")\x01", 2, b""), &config).is_ok());
        assert!(matches!(
            loads(&nested(b")\x01", 3, b""), &config).unwrap_err(),
            DecodeError::RecursionLimitExceeded
        ));
    }

    #[test]
    fn test_invalid_longs() {
        assert!(matches!(
            loads(b"l\x02\x00\x00\x00\x00\x00\x00\x00", &DecodeConfig::default()).unwrap_err(),
            DecodeError::UnnormalizedLong
        ));
        assert!(matches!(
            loads(b"l\x01\x00\x00\x00\x00\x80", &DecodeConfig::default()).unwrap_err(),
            DecodeError::DigitOutOfRange { digit: 0x8000 }
        ));
    }

    #[test]
    fn test_ref_to_reserved_container_slot() {
        let obj = loads_default(b"\xdb\x02\x00\x00\x00\xda\x01ar\x01\x00\x00\x00");
        assert_eq!(obj, Obj::list(vec![Obj::str("a"), Obj::str("a")]));
    }

    #[test]
    fn test_ref_without_reserved_slot() {
        let obj = loads_default(b"[\x02\x00\x00\x00\xda\x01ar\x00\x00\x00\x00");
        assert_eq!(obj, Obj::list(vec![Obj::str("a"), Obj::str("a")]));
    }

    #[test]
    fn test_self_referencing_container_rejected() {
        // A list whose only element is a reference to itself.
        let err = loads(b"\xdb\x01\x00\x00\x00r\x00\x00\x00\x00", &DecodeConfig::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidRef { index: 0 }), "{err}");
    }

    #[test]
    fn test_ref_out_of_range() {
        let err = loads(b"r\x05\x00\x00\x00", &DecodeConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidRef { index: 5 }), "{err}");
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        assert_eq!(loads_default(b"Ngarbage"), Obj::None);
    }

    #[test]
    fn test_code_field_type_checked() {
        // co_code given as a str instead of bytes
        let mut input = vec![b'c'];
        for _ in 0..6 {
            input.extend_from_slice(&0u32.to_le_bytes());
        }
        input.extend_from_slice(b"\xda\x01x");
        let err = loads(&input, &DecodeConfig::default()).unwrap_err();
        match err {
            DecodeError::UnexpectedType { field, expected, found } => {
                assert_eq!((field, expected, found), ("co_code", "bytes", "str"));
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
