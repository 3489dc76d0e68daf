//! Terminal front end for the downloader engine.

use std::process::ExitCode;

mod shell;

fn main() -> anyhow::Result<ExitCode> {
    shell::run_app()
}
