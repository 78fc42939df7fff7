//! Compiled code objects.
//!
//! The attribute table in [`Code::attributes`] stands in for Python's
//! `dir(code)` scan: it lists every `co_` attribute a marshalled code object
//! carries, in the alphabetical order `dir()` reports them.

use bitflags::bitflags;
use std::sync::Arc;

use super::Obj;

bitflags! {
    /// `co_flags` bits, including the `__future__` feature flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CodeFlags: u32 {
        const OPTIMIZED = 0x1;
        const NEWLOCALS = 0x2;
        const VARARGS = 0x4;
        const VARKEYWORDS = 0x8;
        const NESTED = 0x10;
        const GENERATOR = 0x20;
        const NOFREE = 0x40;
        const COROUTINE = 0x80;
        const ITERABLE_COROUTINE = 0x100;
        const ASYNC_GENERATOR = 0x200;
        const GENERATOR_ALLOWED = 0x1000;
        const FUTURE_DIVISION = 0x2000;
        const FUTURE_ABSOLUTE_IMPORT = 0x4000;
        const FUTURE_WITH_STATEMENT = 0x8000;
        const FUTURE_PRINT_FUNCTION = 0x10000;
        const FUTURE_UNICODE_LITERALS = 0x20000;
        const FUTURE_BARRY_AS_BDFL = 0x40000;
        const FUTURE_GENERATOR_STOP = 0x80000;
        const FUTURE_ANNOTATIONS = 0x0010_0000;
    }
}

/// A compiled code object (CPython 3.7 - 3.10 layout).
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub argcount: u32,
    /// Absent in streams written by CPython 3.7.
    pub posonlyargcount: Option<u32>,
    pub kwonlyargcount: u32,
    pub nlocals: u32,
    pub stacksize: u32,
    pub flags: CodeFlags,
    pub code: Arc<[u8]>,
    pub consts: Arc<[Obj]>,
    pub names: Arc<[Arc<str>]>,
    pub varnames: Arc<[Arc<str>]>,
    pub freevars: Arc<[Arc<str>]>,
    pub cellvars: Arc<[Arc<str>]>,
    pub filename: Arc<str>,
    pub name: Arc<str>,
    pub firstlineno: u32,
    pub lnotab: Arc<[u8]>,
}

/// Every `co_` attribute name, alphabetically.
pub const CODE_ATTRIBUTES: [&str; 16] = [
    "co_argcount",
    "co_cellvars",
    "co_code",
    "co_consts",
    "co_filename",
    "co_firstlineno",
    "co_flags",
    "co_freevars",
    "co_kwonlyargcount",
    "co_lnotab",
    "co_name",
    "co_names",
    "co_nlocals",
    "co_posonlyargcount",
    "co_stacksize",
    "co_varnames",
];

fn names_tuple(names: &Arc<[Arc<str>]>) -> Obj {
    Obj::Tuple(names.iter().map(|name| Obj::Str(Arc::clone(name))).collect())
}

fn int(value: u32) -> Obj {
    Obj::from(i64::from(value))
}

impl Code {
    /// Look up one `co_` attribute as a value.
    pub fn attribute(&self, name: &str) -> Option<Obj> {
        let value = match name {
            "co_argcount" => int(self.argcount),
            "co_cellvars" => names_tuple(&self.cellvars),
            "co_code" => Obj::Bytes(Arc::clone(&self.code)),
            "co_consts" => Obj::Tuple(Arc::clone(&self.consts)),
            "co_filename" => Obj::Str(Arc::clone(&self.filename)),
            "co_firstlineno" => int(self.firstlineno),
            "co_flags" => int(self.flags.bits()),
            "co_freevars" => names_tuple(&self.freevars),
            "co_kwonlyargcount" => int(self.kwonlyargcount),
            "co_lnotab" => Obj::Bytes(Arc::clone(&self.lnotab)),
            "co_name" => Obj::Str(Arc::clone(&self.name)),
            "co_names" => names_tuple(&self.names),
            "co_nlocals" => int(self.nlocals),
            "co_posonlyargcount" => int(self.posonlyargcount?),
            "co_stacksize" => int(self.stacksize),
            "co_varnames" => names_tuple(&self.varnames),
            _ => return None,
        };
        Some(value)
    }

    /// All attributes present on this code object, in `dir()` order.
    pub fn attributes(&self) -> Vec<(&'static str, Obj)> {
        CODE_ATTRIBUTES
            .iter()
            .filter_map(|&name| self.attribute(name).map(|value| (name, value)))
            .collect()
    }
}
