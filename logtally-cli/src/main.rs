//! logtally -- syslog parsing and per-process event counting.
//!
//! ```text
//! logtally <INPUT> <PARSED_OUT> <TRAP_OUT> <REPORT_OUT> [--config FILE] [--workers N]
//! ```

mod cli;
mod error;
mod logging;
mod output;
mod run;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
