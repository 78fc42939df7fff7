//! Command surface for the `marshal-json` binary.
//!
//! Commands live in a [`CommandTable`] built once at startup. The first
//! argument selects the command; the rest are handed to it untouched so each
//! command owns its own `clap` parser.

use std::ffi::OsString;
use std::fmt::{self, Write as _};
use std::io::{Read, Write};

use crate::types::{Config, Error, Result};

pub mod marshal2json;

pub use marshal2json::{convert, InputFormat, Marshal2JsonArgs};

/// Handler signature: arguments after the command name, configuration,
/// standard input, standard output.
pub type CommandFn = fn(&[OsString], &Config, &mut dyn Read, &mut dyn Write) -> Result<()>;

#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub about: &'static str,
    pub run: CommandFn,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("about", &self.about)
            .finish_non_exhaustive()
    }
}

/// Immutable name → handler table.
#[derive(Debug, Clone)]
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Every command the binary ships.
    pub fn builtin() -> Self {
        Self::new(vec![Command {
            name: "marshal2json",
            about: "Convert marshal data or a .pyc file to typed JSON",
            run: marshal2json::run,
        }])
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|command| command.name)
    }

    /// The command listing printed with `--help` and after an unknown command.
    pub fn usage(&self) -> String {
        let width = self.names().map(str::len).max().unwrap_or(0);
        let mut text = String::from("Usage: marshal-json <COMMAND> [ARGS]...\n\nCommands:\n");
        for command in &self.commands {
            let _ = writeln!(text, "  {:width$}  {}", command.name, command.about);
        }
        text
    }

    /// Write `err` and the command listing, as printed after a failed lookup.
    pub fn write_usage_listing(&self, err: &Error, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "{err}")?;
        out.write_all(self.usage().as_bytes())?;
        out.flush()
    }

    /// Run the command named by `args[0]` with the remaining arguments.
    pub fn dispatch(
        &self,
        args: &[OsString],
        config: &Config,
        input: &mut dyn Read,
        out: &mut dyn Write,
    ) -> Result<()> {
        let Some((name, rest)) = args.split_first() else {
            return Err(Error::command_not_found("insufficient args"));
        };
        let name = name.to_string_lossy();

        match name.as_ref() {
            "-h" | "--help" => {
                out.write_all(self.usage().as_bytes())?;
                return Ok(());
            }
            "-V" | "--version" => {
                writeln!(out, "marshal-json {}", env!("CARGO_PKG_VERSION"))?;
                return Ok(());
            }
            _ => {}
        }

        let command = self
            .get(&name)
            .ok_or_else(|| Error::command_not_found(format!("'{name}' is not valid")))?;
        tracing::debug!(command = command.name, args = rest.len(), "dispatching command");
        (command.run)(rest, config, input, out)
    }
}
