//! Command-line flags.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use downloader_core::Strategy;
use engine_logging::LogDestination;

/// Fetches a fixed list of web pages using one of four orchestration strategies.
#[derive(Parser, Debug)]
#[command(name = "downloader", version, about)]
pub struct Cli {
    /// RON configuration file. Defaults to ./downloader.ron when present.
    #[arg(short, long, env = "DOWNLOADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run a single strategy and exit instead of starting the interactive shell.
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Request cancellation after this many progress updates.
    #[arg(long, requires = "strategy")]
    pub cancel_after: Option<usize>,

    /// Print the final results as JSON.
    #[arg(long, requires = "strategy")]
    pub json: bool,

    /// Where log records go.
    #[arg(long, value_enum, default_value = "file")]
    pub log: LogArg,

    /// Worker bound for the parallel-blocking strategy.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    SequentialBlocking,
    ParallelBlocking,
    CooperativeSequential,
    CooperativeParallel,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::SequentialBlocking => Strategy::SequentialBlocking,
            StrategyArg::ParallelBlocking => Strategy::ParallelBlocking,
            StrategyArg::CooperativeSequential => Strategy::CooperativeSequential,
            StrategyArg::CooperativeParallel => Strategy::CooperativeParallel,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogArg {
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
            LogArg::Off => LogDestination::Off,
        }
    }
}
