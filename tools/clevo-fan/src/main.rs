use clevo_fan::{Config, StderrLogger, run};
use ec_protocol::{CLEVO, EmbeddedController};
use std::env;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = env::args();
    let prog = args
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());
    let args: Vec<String> = args.collect();

    let config = Config::from_env();
    if let Err(e) = StderrLogger::new(config.log_level).init() {
        eprintln!("{prog}: {e}");
    }

    run(
        &prog,
        &args,
        || EmbeddedController::open(CLEVO, config.timeout_policy),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
    .into()
}
