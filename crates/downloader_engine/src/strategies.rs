//! The four scheduling strategies over one URL list.
//!
//! A transport failure ends any of them with `Err` and no partial list. Only
//! [`run_sequential_async`] looks at a cancellation signal, and only between
//! items.

use futures_util::future::try_join_all;
use rayon::prelude::*;

use engine_logging::{engine_debug, engine_info};

use crate::progress::{ProgressSink, ProgressSnapshot, ResultCollector};
use crate::{
    BlockingFetcher, CancellationSignal, FetchError, FetchResult, Fetcher, RunError, RunOutcome,
};

/// Fetches each URL in turn on the calling thread. Output order is input order.
pub fn run_sequential_blocking(
    fetcher: &dyn BlockingFetcher,
    urls: &[String],
) -> Result<Vec<FetchResult>, FetchError> {
    let mut output = Vec::with_capacity(urls.len());
    for url in urls {
        let result = fetcher.fetch(url)?;
        engine_debug!("sequential-blocking: {} ({} chars)", url, result.len());
        output.push(result);
    }
    Ok(output)
}

/// Fetches all URLs on a rayon pool. `workers` bounds the pool; `None` uses
/// the global pool. Output is in completion order.
pub fn run_parallel_blocking(
    fetcher: &dyn BlockingFetcher,
    urls: &[String],
    workers: Option<usize>,
) -> Result<Vec<FetchResult>, RunError> {
    let collector = ResultCollector::new(urls.len());
    let fetch_all = || {
        urls.par_iter().try_for_each(|url| {
            let result = fetcher.fetch(url)?;
            engine_debug!("parallel-blocking: {} ({} chars)", url, result.len());
            collector.push_quiet(result);
            Ok::<(), FetchError>(())
        })
    };

    match workers {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|index| format!("fetch-worker-{index}"))
                .build()
                .map_err(|err| RunError::Worker(err.to_string()))?;
            pool.install(fetch_all)?;
        }
        None => fetch_all()?,
    }

    Ok(collector.into_results())
}

/// Awaits each URL in input order, reporting after every completion and then
/// checking `cancel`. A set signal ends the run with what was gathered.
pub async fn run_sequential_async(
    fetcher: &dyn Fetcher,
    urls: &[String],
    cancel: &CancellationSignal,
    sink: &dyn ProgressSink,
) -> Result<RunOutcome, FetchError> {
    let mut output = Vec::with_capacity(urls.len());
    for url in urls {
        let result = fetcher.fetch(url).await?;
        engine_debug!("cooperative-sequential: {} ({} chars)", url, result.len());
        output.push(result);

        sink.report(ProgressSnapshot::new(output.clone(), urls.len()));

        if cancel.is_triggered() {
            engine_info!(
                "cancellation observed after {} of {} urls",
                output.len(),
                urls.len()
            );
            return Ok(RunOutcome::Cancelled(output));
        }
    }
    Ok(RunOutcome::Completed(output))
}

/// Awaits all URLs concurrently on the current task. Each completion appends
/// to the shared output and reports. Output is in completion order.
pub async fn run_parallel_async(
    fetcher: &dyn Fetcher,
    urls: &[String],
    sink: &dyn ProgressSink,
) -> Result<Vec<FetchResult>, FetchError> {
    let collector = ResultCollector::new(urls.len());
    let shared = &collector;

    let tasks = urls.iter().map(|url| async move {
        let result = fetcher.fetch(url).await?;
        engine_debug!("cooperative-parallel: {} ({} chars)", url, result.len());
        sink.report(shared.push(result));
        Ok::<(), FetchError>(())
    });
    try_join_all(tasks).await?;

    Ok(collector.into_results())
}
