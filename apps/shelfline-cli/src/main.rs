//! # Shelfline Entry Point
//!
//! Parses arguments, sets up logging and runs one command. Failures print
//! as `[CODE] message` (or JSON with `--json`) and map to a non-zero exit
//! code per [`ErrorCode`](shelfline_cli::error::ErrorCode).

use std::process::ExitCode;

use clap::Parser;
use shelfline_cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                match serde_json::to_string(&err) {
                    Ok(body) => eprintln!("{}", body),
                    Err(_) => eprintln!("{}", err),
                }
            } else {
                eprintln!("{}", err);
            }
            ExitCode::from(err.code.exit_code())
        }
    }
}
