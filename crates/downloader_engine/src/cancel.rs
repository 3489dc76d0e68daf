use tokio_util::sync::CancellationToken;

/// One-shot stop request for a single run.
///
/// Clones share the same flag. The flag only ever goes from unset to set;
/// a new run must use a new signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; safe from any thread.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }
}
