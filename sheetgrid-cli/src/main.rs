mod args;
mod browse;
mod error;
mod gate;
mod paths;
mod serve;

use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::args::Cli;
use crate::args::Command;
use crate::error::CliError;

/// Sets up file logging under the cache directory, rotating the previous log.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    match File::create(&path) {
        Ok(file) => {
            if WriteLogger::init(level, Config::default(), file).is_err() {
                eprintln!("warning: logger already initialized");
            }
        }
        Err(e) => eprintln!("warning: cannot create {}: {}", path.display(), e),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let marker = cli.session_file.clone().or_else(paths::session_marker);

    match cli.command {
        Command::Serve(args) => serve::run(args).await,
        Command::Browse(args) => {
            let context = gate::context(marker.as_deref());
            log::debug!("session context: {:?}", context);
            browse::run(args, context).await
        }
        Command::Login => {
            let marker = marker.ok_or(CliError::NoDataDir)?;
            gate::login(&marker)?;
            println!("Logged in");
            Ok(())
        }
        Command::Logout => {
            let marker = marker.ok_or(CliError::NoDataDir)?;
            if gate::logout(&marker)? {
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::info!("sheetgrid {} starting", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Data(sheetgrid_lib::error::Error::Unauthenticated)) => {
            eprintln!("Error: not logged in, run `sheetgrid login` first");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
