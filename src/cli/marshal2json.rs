//! `marshal2json`: decode marshal data (or a `.pyc` file) and print typed JSON.

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use crate::encoder;
use crate::marshal::{self, BytecodeHeader};
use crate::types::{Config, Error, Result};

/// Layout of the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// A bare marshal stream.
    #[default]
    Plain,
    /// A timestamp-based `.pyc`: 16-byte header, then a marshal stream.
    Bytecode,
}

impl FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain" => Ok(InputFormat::Plain),
            "bytecode" => Ok(InputFormat::Bytecode),
            other => Err(Error::invalid_format(other)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputFormat::Plain => "plain",
            InputFormat::Bytecode => "bytecode",
        })
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "marshal2json",
    version,
    about = "Convert marshal data or a .pyc file to typed JSON"
)]
pub struct Marshal2JsonArgs {
    /// Input layout: plain | bytecode
    #[arg(long, value_name = "FORMAT", default_value = "plain")]
    pub format: String,

    /// File to read; standard input when omitted
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

/// Decode `data` according to `format` and encode it as typed JSON text.
pub fn convert(data: &[u8], format: InputFormat, config: &Config) -> Result<String> {
    let (payload, decode_config) = match format {
        InputFormat::Plain => (data, config.decode),
        InputFormat::Bytecode => {
            let (header, payload) = BytecodeHeader::strip(data)?;
            (payload, header.decode_config(config.decode))
        }
    };
    let value = marshal::loads(payload, &decode_config)?;
    let json = encoder::encode(&value, &config.encode)?;
    tracing::debug!(
        type_name = value.type_name(),
        json_bytes = json.len(),
        "encoded value"
    );
    Ok(json)
}

pub fn run(
    args: &[OsString],
    config: &Config,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<()> {
    let argv = std::iter::once(OsString::from("marshal2json")).chain(args.iter().cloned());
    let args = match Marshal2JsonArgs::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                write!(out, "{}", err.render())?;
                return Ok(());
            }
            _ => return Err(Error::usage(err.render().to_string().trim_end())),
        },
    };
    let format: InputFormat = args.format.parse()?;

    let data = match &args.path {
        Some(path) => std::fs::read(path).map_err(|err| {
            Error::Io(std::io::Error::new(
                err.kind(),
                format!("{}: {err}", path.display()),
            ))
        })?,
        None => {
            let mut data = Vec::new();
            input.read_to_end(&mut data)?;
            data
        }
    };
    tracing::debug!(%format, bytes = data.len(), "read input");

    let json = convert(&data, format, config)?;
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}
