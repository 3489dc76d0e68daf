//! Downloader engine: fetch transports, the four orchestration strategies, and
//! the background engine handle.
mod cancel;
mod config;
mod decode;
mod engine;
mod fetch;
mod orchestrator;
mod progress;
mod strategies;
mod types;

pub use cancel::CancellationSignal;
pub use config::{EngineConfig, DEFAULT_URLS};
pub use decode::{decode_text, DecodedText};
pub use engine::EngineHandle;
pub use fetch::{BlockingFetcher, BlockingReqwestFetcher, FetchSettings, Fetcher, ReqwestFetcher};
pub use orchestrator::OrchestrationEngine;
pub use progress::{
    percent_complete, ChannelProgressSink, NullProgressSink, ProgressSink, ProgressSnapshot,
};
pub use strategies::{
    run_parallel_async, run_parallel_blocking, run_sequential_async, run_sequential_blocking,
};
pub use types::{
    EngineError, EngineEvent, FailureKind, FetchError, FetchResult, RunError, RunId, RunOutcome,
    Strategy,
};
