//! # clevo-fan
//!
//! Command dispatcher for Clevo embedded controller fan control:
//!
//! ```text
//! clevo-fan get [-b] [-c] [-g] [-d] [-r]
//! clevo-fan set -d <0-100>
//! clevo-fan help | version
//! ```
//!
//! [`run`] does all the work against any controller the caller connects to,
//! which keeps the binary a thin shell around it.

pub mod cli;
mod commands;
pub mod config;
mod error;
mod logger;
mod usage;

pub use commands::parse_duty;
pub use config::Config;
pub use error::{CliError, ValidationError};
pub use logger::StderrLogger;

use ec_ports::PortIo;
use ec_protocol::wait::Delay;
use ec_protocol::{EcError, EmbeddedController};
use std::io::{self, Write};
use std::process::ExitCode;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process outcome.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => Self::SUCCESS,
            Exit::Failure => Self::FAILURE,
        }
    }
}

/// Run one command line.
///
/// `args` excludes the program name, which is passed as `prog` for messages.
/// `connect` is only called once a command has validated its arguments and
/// needs the controller.
pub fn run<P, D, C>(
    prog: &str,
    args: &[String],
    connect: C,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Exit
where
    P: PortIo,
    D: Delay,
    C: FnOnce() -> Result<EmbeddedController<P, D>, EcError>,
{
    let Some((command, rest)) = args.split_first() else {
        return report(usage::main_usage(out, prog));
    };

    let result = match command.as_str() {
        "help" | "-h" | "--help" => return report(usage::main_usage(out, prog)),
        "version" | "-v" | "--version" => return report(writeln!(out, "{VERSION}")),
        "get" => commands::get(prog, rest, connect, out),
        "set" => commands::set(prog, rest, connect, out),
        unknown => {
            let _ = writeln!(err, "{prog}: unknown command: {unknown}")
                .and_then(|()| usage::main_usage(err, prog));
            return Exit::Failure;
        }
    };

    match result {
        Ok(exit) => exit,
        Err(e) => {
            log::debug!("{command} failed: {e:?}");
            let _ = writeln!(err, "{prog}: {command}: {e}");
            if e.wants_usage() {
                let _ = match command.as_str() {
                    "get" => usage::get_usage(err, prog),
                    _ => usage::set_usage(err, prog),
                };
            }
            Exit::Failure
        }
    }
}

fn report(written: io::Result<()>) -> Exit {
    match written {
        Ok(()) => Exit::Success,
        Err(e) => {
            log::error!("cannot write output: {e}");
            Exit::Failure
        }
    }
}
