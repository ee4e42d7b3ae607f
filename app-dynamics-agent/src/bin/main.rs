//! Entry point of the AppDynamics agent buildpack framework.
//!
//! Phase results go to stdout, where the buildpack reads them. Logs go to stderr.
use app_dynamics_agent::cli::{Cli, PhaseOutput};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    // Logging is not initialized when this fails
    let command = match Cli::init() {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match command.run() {
        Ok(PhaseOutput::Detected(tag)) => {
            println!("{tag}");
            ExitCode::SUCCESS
        }
        Ok(PhaseOutput::NotApplicable) => ExitCode::FAILURE,
        Ok(PhaseOutput::Compiled) => ExitCode::SUCCESS,
        Ok(PhaseOutput::Released(java_opts)) => {
            println!("{java_opts}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Phase failed: {err}");
            ExitCode::FAILURE
        }
    }
}
