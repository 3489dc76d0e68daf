mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use downloader_engine::{
    run_parallel_async, run_parallel_blocking, run_sequential_async, run_sequential_blocking,
    CancellationSignal, FailureKind, NullProgressSink, OrchestrationEngine, RunError, RunOutcome,
    Strategy,
};
use pretty_assertions::assert_eq;

use common::{body_for, init_logging, sorted_urls, urls, RecordingSink, StubFetcher};

fn engine_with(fetcher: StubFetcher, workers: Option<usize>) -> OrchestrationEngine {
    let fetcher = Arc::new(fetcher);
    OrchestrationEngine::with_fetchers(fetcher.clone(), fetcher, workers)
}

#[tokio::test]
async fn every_strategy_returns_each_url_exactly_once() {
    init_logging();
    let input = urls(6);
    let mut expected = input.clone();
    expected.sort();

    for strategy in Strategy::ALL {
        let engine = engine_with(StubFetcher::new().with_jitter(&input, 7, 10), None);
        let outcome = engine
            .run(&input, strategy, &CancellationSignal::new(), &NullProgressSink)
            .await
            .expect("run succeeds");

        assert!(!outcome.is_cancelled(), "{strategy} reported cancellation");
        assert_eq!(sorted_urls(outcome.results()), expected, "{strategy}");
        for result in outcome.results() {
            assert_eq!(result.content(), body_for(result.url()));
            assert_eq!(result.len(), body_for(result.url()).len());
        }
    }
}

#[tokio::test]
async fn sequential_strategies_preserve_input_order() {
    init_logging();
    let input = urls(8);
    // Earlier urls are slower, so completion order would reverse input order.
    let mut fetcher = StubFetcher::new();
    for (i, url) in input.iter().enumerate() {
        fetcher = fetcher.with_delay(url, Duration::from_millis((8 - i as u64) * 3));
    }
    let engine = engine_with(fetcher, None);

    let ordered: Vec<_> = Strategy::ALL
        .into_iter()
        .filter(|s| s.preserves_order())
        .collect();
    assert_eq!(
        ordered,
        vec![Strategy::SequentialBlocking, Strategy::CooperativeSequential]
    );

    for strategy in ordered {
        let outcome = engine
            .run(&input, strategy, &CancellationSignal::new(), &NullProgressSink)
            .await
            .unwrap();
        let got: Vec<_> = outcome.results().iter().map(|r| r.url().to_string()).collect();
        assert_eq!(got, input, "{strategy}");
    }
}

#[tokio::test]
async fn cooperative_sequential_snapshots_follow_input_order() {
    let input = urls(4);
    let fetcher = StubFetcher::new();
    let sink = RecordingSink::new();

    run_sequential_async(&fetcher, &input, &CancellationSignal::new(), &sink)
        .await
        .unwrap();

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 4);
    for (i, snapshot) in snapshots.iter().enumerate() {
        let got: Vec<_> = snapshot.completed().iter().map(|r| r.url()).collect();
        let want: Vec<_> = input[..=i].iter().map(String::as_str).collect();
        assert_eq!(got, want);
    }
}

#[tokio::test]
async fn cancelling_after_kth_snapshot_stops_cooperative_sequential() {
    init_logging();
    let input = urls(6);

    for k in 0..input.len() {
        let signal = CancellationSignal::new();
        let sink = if k == 0 {
            signal.trigger();
            RecordingSink::new()
        } else {
            RecordingSink::cancelling_after(k, signal.clone())
        };
        let fetcher = StubFetcher::new();

        let outcome = run_sequential_async(&fetcher, &input, &signal, &sink)
            .await
            .expect("cancellation is not a failure");

        let snapshots = sink.snapshots();
        match &outcome {
            RunOutcome::Cancelled(results) => {
                assert!(results.len() <= k + 1, "k={k} got {}", results.len());
                assert_eq!(snapshots.len(), results.len(), "k={k}");
                assert_eq!(fetcher.calls(), results.len(), "k={k}");
            }
            RunOutcome::Completed(_) => panic!("k={k}: run was not cancelled"),
        }
        assert_eq!(
            snapshots.last().map(|s| s.completed_count()),
            Some(outcome.results().len())
        );
    }
}

#[tokio::test]
async fn cooperative_sequential_progress_is_monotonic() {
    let input = urls(7);
    let fetcher = StubFetcher::new();
    let sink = RecordingSink::new();

    run_sequential_async(&fetcher, &input, &CancellationSignal::new(), &sink)
        .await
        .unwrap();

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), input.len());
    for pair in snapshots.windows(2) {
        assert!(pair[0].percent_complete() <= pair[1].percent_complete());
        assert!(pair[0].completed_count() < pair[1].completed_count());
    }
    assert_eq!(snapshots.last().unwrap().percent_complete(), 100);
}

#[tokio::test]
async fn half_of_six_completions_reports_fifty_percent() {
    let input = urls(6);
    let sink = RecordingSink::new();

    run_sequential_async(&StubFetcher::new(), &input, &CancellationSignal::new(), &sink)
        .await
        .unwrap();

    let percents: Vec<u8> = sink.snapshots().iter().map(|s| s.percent_complete()).collect();
    assert_eq!(percents, vec![16, 33, 50, 66, 83, 100]);
}

#[tokio::test]
async fn cooperative_parallel_reports_every_completion() {
    let input = urls(10);
    let fetcher = StubFetcher::new().with_jitter(&input, 3, 20);
    let sink = RecordingSink::new();

    let results = run_parallel_async(&fetcher, &input, &sink).await.unwrap();

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 10);
    let counts: Vec<_> = snapshots.iter().map(|s| s.completed_count()).collect();
    assert_eq!(counts, (1..=10).collect::<Vec<_>>());
    assert_eq!(snapshots.last().unwrap().completed(), results.as_slice());
}

#[tokio::test]
async fn non_polling_strategies_ignore_a_triggered_signal() {
    let input = urls(5);
    let signal = CancellationSignal::new();
    signal.trigger();
    signal.trigger();

    for strategy in [
        Strategy::SequentialBlocking,
        Strategy::ParallelBlocking,
        Strategy::CooperativeParallel,
    ] {
        let engine = engine_with(StubFetcher::new(), Some(2));
        let outcome = engine
            .run(&input, strategy, &signal, &NullProgressSink)
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Completed(ref r) if r.len() == 5));
    }
}

#[tokio::test]
async fn single_failure_aborts_the_batch() {
    init_logging();
    let input = urls(6);
    let bad = input[3].clone();

    for strategy in Strategy::ALL {
        let engine = engine_with(StubFetcher::new().failing_on(&bad), None);
        let err = engine
            .run(&input, strategy, &CancellationSignal::new(), &NullProgressSink)
            .await
            .expect_err("failure must propagate");

        match err {
            RunError::Transport(fetch_err) => {
                assert_eq!(fetch_err.url, bad);
                assert_eq!(fetch_err.kind, FailureKind::HttpStatus(500));
            }
            other => panic!("{strategy}: unexpected error {other:?}"),
        }
    }
}

#[test]
fn blocking_entry_points_run_without_a_runtime() {
    let input = urls(4);
    let fetcher = StubFetcher::new().with_jitter(&input, 11, 5);

    let sequential = run_sequential_blocking(&fetcher, &input).unwrap();
    let got: Vec<_> = sequential.iter().map(|r| r.url().to_string()).collect();
    assert_eq!(got, input);

    let parallel = run_parallel_blocking(&fetcher, &input, Some(3)).unwrap();
    let mut expected = input.clone();
    expected.sort();
    assert_eq!(sorted_urls(&parallel), expected);
    assert_eq!(fetcher.calls(), 8);
}

#[test]
fn parallel_blocking_failure_returns_no_results() {
    let input = urls(6);
    let fetcher = StubFetcher::new().failing_on(&input[0]);

    let err = run_parallel_blocking(&fetcher, &input, Some(2)).unwrap_err();
    assert!(matches!(err, RunError::Transport(ref e) if e.url == input[0]));
}

#[test]
fn parallel_blocking_stress_keeps_every_append() {
    let input = urls(50);
    for seed in 0..5 {
        let fetcher = StubFetcher::new().with_jitter(&input, seed, 10);
        let results = run_parallel_blocking(&fetcher, &input, Some(8)).unwrap();

        assert_eq!(results.len(), 50, "seed={seed}");
        let unique: HashSet<_> = results.iter().map(|r| r.url()).collect();
        assert_eq!(unique.len(), 50, "seed={seed}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cooperative_parallel_stress_keeps_every_append() {
    let input = urls(50);
    for seed in 0..5 {
        let fetcher = StubFetcher::new().with_jitter(&input, seed, 10);
        let sink = RecordingSink::new();
        let results = run_parallel_async(&fetcher, &input, &sink).await.unwrap();

        assert_eq!(results.len(), 50, "seed={seed}");
        let unique: HashSet<_> = results.iter().map(|r| r.url()).collect();
        assert_eq!(unique.len(), 50, "seed={seed}");
        assert_eq!(sink.snapshots().len(), 50, "seed={seed}");
    }
}

#[tokio::test]
async fn empty_input_completes_without_progress() {
    let sink = RecordingSink::new();
    for strategy in Strategy::ALL {
        let engine = engine_with(StubFetcher::new(), None);
        let outcome = engine
            .run(&[], strategy, &CancellationSignal::new(), &sink)
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Completed(Vec::new()));
    }
    assert!(sink.snapshots().is_empty());
}
