//! The 16-byte header of timestamp-based `.pyc` files.
//!
//! ```text
//! magic: u16 LE | b"\r\n" | flags: u32 LE | mtime: u32 LE | source_size: u32 LE
//! ```

use byteorder::{ByteOrder, LittleEndian};

use super::DecodeError;
use crate::types::DecodeConfig;

/// Length of the header in bytes.
pub const HEADER_LEN: usize = 16;

/// First magic with the 16-byte header (3.7a4).
const MAGIC_16_BYTE_HEADER: u16 = 3390;
/// First magic whose code objects carry `co_posonlyargcount` (3.8a4).
const MAGIC_POSONLYARGCOUNT: u16 = 3410;
/// First magic with the 3.11 code object layout.
const MAGIC_311_CODE_LAYOUT: u16 = 3495;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytecodeHeader {
    pub magic: u16,
    pub flags: u32,
    pub mtime: u32,
    pub source_size: u32,
}

impl BytecodeHeader {
    /// Parse and validate the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < HEADER_LEN {
            return Err(DecodeError::BadHeader(format!(
                "expected {HEADER_LEN} bytes, found {}",
                data.len()
            )));
        }
        if &data[2..4] != b"\r\n" {
            return Err(DecodeError::BadHeader(
                "magic number is not followed by \\r\\n".to_string(),
            ));
        }

        let header = Self {
            magic: LittleEndian::read_u16(&data[0..2]),
            flags: LittleEndian::read_u32(&data[4..8]),
            mtime: LittleEndian::read_u32(&data[8..12]),
            source_size: LittleEndian::read_u32(&data[12..16]),
        };

        if header.flags != 0 {
            return Err(DecodeError::BadHeader(format!(
                "flags {:#x} mark a hash-based pyc",
                header.flags
            )));
        }
        if header.magic < MAGIC_16_BYTE_HEADER {
            return Err(DecodeError::UnsupportedMagic {
                magic: header.magic,
                reason: "written before CPython 3.7, header is not 16 bytes",
            });
        }
        if header.magic >= MAGIC_311_CODE_LAYOUT {
            return Err(DecodeError::UnsupportedMagic {
                magic: header.magic,
                reason: "CPython 3.11+ code object layout",
            });
        }
        Ok(header)
    }

    /// Split `data` into its header and the marshal payload after it.
    pub fn strip(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let header = Self::parse(data)?;
        tracing::debug!(
            magic = header.magic,
            mtime = header.mtime,
            source_size = header.source_size,
            "stripped bytecode header"
        );
        Ok((header, &data[HEADER_LEN..]))
    }

    pub fn has_posonlyargcount(&self) -> bool {
        self.magic >= MAGIC_POSONLYARGCOUNT
    }

    /// `base` with the code layout this header's magic implies.
    pub fn decode_config(&self, base: DecodeConfig) -> DecodeConfig {
        DecodeConfig {
            has_posonlyargcount: self.has_posonlyargcount(),
            ..base
        }
    }
}
