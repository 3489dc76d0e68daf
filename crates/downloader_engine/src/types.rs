use std::fmt;
use std::time::Duration;

use crate::progress::ProgressSnapshot;

pub type RunId = u64;

/// Scheduling policy for one run over the URL list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One fetch at a time on the calling thread.
    SequentialBlocking,
    /// All fetches spread over a worker pool; completion order.
    ParallelBlocking,
    /// Awaited one by one in input order, with progress and cancellation.
    CooperativeSequential,
    /// All fetches awaited concurrently on one task, with progress.
    CooperativeParallel,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::SequentialBlocking,
        Strategy::ParallelBlocking,
        Strategy::CooperativeSequential,
        Strategy::CooperativeParallel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::SequentialBlocking => "sequential-blocking",
            Strategy::ParallelBlocking => "parallel-blocking",
            Strategy::CooperativeSequential => "cooperative-sequential",
            Strategy::CooperativeParallel => "cooperative-parallel",
        }
    }

    /// Only the cooperative sequential strategy checks its cancellation signal.
    pub fn polls_cancellation(self) -> bool {
        matches!(self, Strategy::CooperativeSequential)
    }

    pub fn reports_progress(self) -> bool {
        matches!(
            self,
            Strategy::CooperativeSequential | Strategy::CooperativeParallel
        )
    }

    pub fn preserves_order(self) -> bool {
        matches!(
            self,
            Strategy::SequentialBlocking | Strategy::CooperativeSequential
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text content retrieved for one URL. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    url: String,
    content: String,
    error: Option<String>,
}

impl FetchResult {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            error: None,
        }
    }

    /// A result carrying a failure description instead of content.
    ///
    /// The strategies never build these: a failed fetch aborts the whole run.
    pub fn failed(error: &FetchError) -> Self {
        Self {
            url: error.url.clone(),
            content: String::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Length of the content in characters.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to fetch {url}: {kind} ({message})")]
pub struct FetchError {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "connect timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Vec<FetchResult>),
    /// Stopped early on request; holds everything gathered before the stop.
    Cancelled(Vec<FetchResult>),
}

impl RunOutcome {
    pub fn results(&self) -> &[FetchResult] {
        match self {
            RunOutcome::Completed(results) | RunOutcome::Cancelled(results) => results,
        }
    }

    pub fn into_results(self) -> Vec<FetchResult> {
        match self {
            RunOutcome::Completed(results) | RunOutcome::Cancelled(results) => results,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled(_))
    }
}

/// A run that produced no usable result list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Transport(#[from] FetchError),
    #[error("worker failure: {0}")]
    Worker(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine: {0}")]
    Startup(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        run_id: RunId,
        snapshot: ProgressSnapshot,
    },
    RunFinished {
        run_id: RunId,
        strategy: Strategy,
        elapsed: Duration,
        result: Result<RunOutcome, RunError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters_not_bytes() {
        let result = FetchResult::new("https://example.com", "héllo");
        assert_eq!(result.len(), 5);
        assert!(result.error().is_none());
    }

    #[test]
    fn failed_result_carries_error_text() {
        let err = FetchError::new("https://x.test", FailureKind::HttpStatus(503), "503");
        let result = FetchResult::failed(&err);
        assert_eq!(result.url(), "https://x.test");
        assert!(result.is_empty());
        assert_eq!(
            result.error(),
            Some("failed to fetch https://x.test: http status 503 (503)")
        );
    }

    #[test]
    fn only_cooperative_sequential_polls_cancellation() {
        let polling: Vec<_> = Strategy::ALL
            .into_iter()
            .filter(|s| s.polls_cancellation())
            .collect();
        assert_eq!(polling, vec![Strategy::CooperativeSequential]);
    }
}
