use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use compass_cli::{
    Args,
    error_adapter::{render, to_reportables},
};

fn init_logging(level: LevelFilter) {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(args.log_level);
    debug!(args:?; "Starting Compass");

    match compass_cli::run(&args) {
        Ok(()) => {
            info!(report = args.output; "Assessment report written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            to_reportables(&err)
                .iter()
                .for_each(|reportable| error!("{}", render(reportable)));
            ExitCode::FAILURE
        }
    }
}
