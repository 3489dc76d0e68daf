//! Logger setup for the shell.
//!
//! File output goes to `./downloader.log` in the current working directory.

use std::path::Path;

use engine_logging::LogDestination;
use log::LevelFilter;

const LOG_FILENAME: &str = "./downloader.log";

pub fn initialize(destination: LogDestination, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if !engine_logging::initialize(destination, level, Path::new(LOG_FILENAME))
        && destination != LogDestination::Off
    {
        eprintln!("Warning: logging could not be initialized");
    }
}
