#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use downloader_engine::{
    BlockingFetcher, CancellationSignal, FailureKind, FetchError, FetchResult, Fetcher,
    ProgressSink, ProgressSnapshot,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://site-{i}.test/"))
        .collect()
}

pub fn body_for(url: &str) -> String {
    format!("<html>{url}</html>")
}

/// In-memory fetcher usable from both blocking and async strategies.
#[derive(Default)]
pub struct StubFetcher {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Assigns pseudo-random delays in `1..=max_ms` milliseconds from a small LCG.
    pub fn with_jitter(mut self, urls: &[String], seed: u64, max_ms: u64) -> Self {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        for url in urls {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let ms = 1 + (state >> 33) % max_ms;
            self.delays.insert(url.clone(), Duration::from_millis(ms));
        }
        self
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn delay_for(&self, url: &str) -> Duration {
        self.delays.get(url).copied().unwrap_or_default()
    }

    fn outcome(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(url) {
            return Err(FetchError::new(
                url,
                FailureKind::HttpStatus(500),
                "500 Internal Server Error",
            ));
        }
        Ok(FetchResult::new(url, body_for(url)))
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let delay = self.delay_for(url);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.outcome(url)
    }
}

impl BlockingFetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let delay = self.delay_for(url);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.outcome(url)
    }
}

/// Records snapshots; optionally triggers a signal once `trigger_at` snapshots arrived.
#[derive(Default)]
pub struct RecordingSink {
    snapshots: Mutex<Vec<ProgressSnapshot>>,
    trigger: Option<(usize, CancellationSignal)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(count: usize, signal: CancellationSignal) -> Self {
        Self {
            snapshots: Mutex::new(Vec::new()),
            trigger: Some((count, signal)),
        }
    }

    pub fn snapshots(&self) -> Vec<ProgressSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, snapshot: ProgressSnapshot) {
        let mut snapshots = self.snapshots.lock().unwrap();
        snapshots.push(snapshot);
        if let Some((count, signal)) = &self.trigger {
            if snapshots.len() == *count {
                signal.trigger();
            }
        }
    }
}

pub fn sorted_urls(results: &[FetchResult]) -> Vec<String> {
    let mut urls: Vec<String> = results.iter().map(|r| r.url().to_string()).collect();
    urls.sort();
    urls
}
