//! Bindery - build pipeline for book manuscripts

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = bindery::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
