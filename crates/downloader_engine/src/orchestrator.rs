use std::sync::Arc;
use std::time::Instant;

use engine_logging::{engine_info, engine_warn};

use crate::fetch::{BlockingReqwestFetcher, ReqwestFetcher};
use crate::progress::ProgressSink;
use crate::strategies::{
    run_parallel_async, run_parallel_blocking, run_sequential_async, run_sequential_blocking,
};
use crate::{
    BlockingFetcher, CancellationSignal, EngineConfig, Fetcher, RunError, RunOutcome, Strategy,
};

/// Runs any of the four strategies behind one async entry point.
///
/// The blocking strategies are moved onto tokio's blocking pool so the caller's
/// runtime keeps serving other tasks while they run.
#[derive(Clone)]
pub struct OrchestrationEngine {
    fetcher: Arc<dyn Fetcher>,
    blocking_fetcher: Arc<dyn BlockingFetcher>,
    parallel_workers: Option<usize>,
}

impl OrchestrationEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_fetchers(
            Arc::new(ReqwestFetcher::new(config.fetch.clone())),
            Arc::new(BlockingReqwestFetcher::new(config.fetch.clone())),
            config.parallel_workers,
        )
    }

    pub fn with_fetchers(
        fetcher: Arc<dyn Fetcher>,
        blocking_fetcher: Arc<dyn BlockingFetcher>,
        parallel_workers: Option<usize>,
    ) -> Self {
        Self {
            fetcher,
            blocking_fetcher,
            parallel_workers,
        }
    }

    /// `cancel` is only consulted by [`Strategy::CooperativeSequential`] and
    /// `sink` only receives snapshots from the cooperative strategies.
    pub async fn run(
        &self,
        urls: &[String],
        strategy: Strategy,
        cancel: &CancellationSignal,
        sink: &dyn ProgressSink,
    ) -> Result<RunOutcome, RunError> {
        engine_info!("run started: strategy={} urls={}", strategy, urls.len());
        let started = Instant::now();

        let result = match strategy {
            Strategy::SequentialBlocking => {
                let fetcher = self.blocking_fetcher.clone();
                let urls = urls.to_vec();
                tokio::task::spawn_blocking(move || {
                    run_sequential_blocking(fetcher.as_ref(), &urls)
                })
                .await
                .map_err(|err| RunError::Worker(err.to_string()))
                .and_then(|result| result.map_err(RunError::from))
                .map(RunOutcome::Completed)
            }
            Strategy::ParallelBlocking => {
                let fetcher = self.blocking_fetcher.clone();
                let urls = urls.to_vec();
                let workers = self.parallel_workers;
                tokio::task::spawn_blocking(move || {
                    run_parallel_blocking(fetcher.as_ref(), &urls, workers)
                })
                .await
                .map_err(|err| RunError::Worker(err.to_string()))
                .and_then(|result| result)
                .map(RunOutcome::Completed)
            }
            Strategy::CooperativeSequential => {
                run_sequential_async(self.fetcher.as_ref(), urls, cancel, sink)
                    .await
                    .map_err(RunError::from)
            }
            Strategy::CooperativeParallel => {
                run_parallel_async(self.fetcher.as_ref(), urls, sink)
                    .await
                    .map(RunOutcome::Completed)
                    .map_err(RunError::from)
            }
        };

        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(RunOutcome::Completed(results)) => engine_info!(
                "run completed: strategy={} results={} elapsed_ms={}",
                strategy,
                results.len(),
                elapsed_ms
            ),
            Ok(RunOutcome::Cancelled(results)) => engine_info!(
                "run cancelled: strategy={} results={} elapsed_ms={}",
                strategy,
                results.len(),
                elapsed_ms
            ),
            Err(err) => engine_warn!(
                "run failed: strategy={} elapsed_ms={} error={}",
                strategy,
                elapsed_ms,
                err
            ),
        }
        result
    }
}
