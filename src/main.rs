mod cli;
mod execute;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use setup_mmock::workflow::{format_log_line, in_actions, set_failed};

use crate::cli::CLI;

fn main() -> ExitCode {
    let cli = CLI::parse();
    init_logging(cli.verbose);

    match execute::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(error) = err.downcast_ref::<setup_mmock::Error>() {
                log::debug!("{}", error.kind());
            }
            set_failed(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let actions = in_actions();
    // the runner hides debug lines unless step debugging is enabled
    let level = match (verbose, actions) {
        (0, false) => LevelFilter::Info,
        (0, true) | (1, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("setup_mmock", level)
        .target(env_logger::Target::Stdout)
        .format(move |buf, record| {
            writeln!(
                buf,
                "{}",
                format_log_line(record.level(), &record.args().to_string(), actions)
            )
        })
        .init();
}
