use crate::{ResultLine, Strategy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a strategy to run.
    RunRequested(Strategy),
    /// User asked to cancel the active run.
    CancelRequested,
    /// Engine progress snapshot for the active run.
    Progress { percent: u8, lines: Vec<ResultLine> },
    /// Engine finished the run with every result.
    RunCompleted {
        lines: Vec<ResultLine>,
        elapsed_ms: u128,
    },
    /// Engine stopped the run on request; `lines` holds what was gathered.
    RunCancelled {
        lines: Vec<ResultLine>,
        elapsed_ms: u128,
    },
    /// Engine aborted the run on a failure.
    RunFailed { message: String, elapsed_ms: u128 },
    /// User asked to leave.
    QuitRequested,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for unrecognised input.
    NoOp,
}
