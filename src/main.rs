//! `marshal-json` command-line entry point.
//!
//! Usage: `marshal-json marshal2json [--format plain|bytecode] [PATH]`

use std::ffi::OsString;
use std::process::ExitCode;

use marshal_json::cli::CommandTable;
use marshal_json::{observability, Config};

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };
    observability::init_tracing(&config.observability);

    let commands = CommandTable::builtin();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match commands.dispatch(&args, &config, &mut stdin.lock(), &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            if err.is_usage_listing() {
                if let Err(write_err) = commands.write_usage_listing(&err, &mut out) {
                    eprintln!("{err}: {write_err}");
                }
            } else {
                eprintln!("{err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
