use std::io;
use std::process::ExitCode;

use pjs::cli::{self, Command, USAGE};
use pjs::pipeline;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Logging goes to stderr; PJS_LOG wins over RUST_LOG.
    let filter = EnvFilter::try_from_env("PJS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let args = match cli::parse_args() {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("pjs {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("pjs: {e}");
            eprintln!("Run 'pjs --help' for usage.");
            return ExitCode::from(2);
        }
    };

    match pipeline::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // A closed pipe downstream (`pjs … | head`) is not a failure.
            if pipeline::is_broken_pipe(&e) {
                return ExitCode::SUCCESS;
            }
            eprintln!("pjs: {e:#}");
            ExitCode::FAILURE
        }
    }
}
