use crate::view_model::{format_result_line, AppViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    /// Cancel was forwarded; waiting for the engine to stop the run.
    Cancelling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SequentialBlocking,
    ParallelBlocking,
    CooperativeSequential,
    CooperativeParallel,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::SequentialBlocking => "Sequential (blocking)",
            Strategy::ParallelBlocking => "Parallel (blocking)",
            Strategy::CooperativeSequential => "Async sequential",
            Strategy::CooperativeParallel => "Async parallel",
        }
    }

    pub fn polls_cancellation(self) -> bool {
        matches!(self, Strategy::CooperativeSequential)
    }

    pub fn reports_progress(self) -> bool {
        matches!(
            self,
            Strategy::CooperativeSequential | Strategy::CooperativeParallel
        )
    }
}

/// One row of the results pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub url: String,
    pub chars: usize,
    pub error: Option<String>,
}

/// How the most recent run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    Completed,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub strategy: Strategy,
    pub end: RunEnd,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    run: RunState,
    strategy: Option<Strategy>,
    lines: Vec<ResultLine>,
    percent: u8,
    status: Vec<String>,
    last_run: Option<RunSummary>,
    quitting: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let active_strategy = self.strategy.filter(|_| self.run != RunState::Idle);
        AppViewModel {
            run: self.run,
            strategy: self.strategy,
            percent: self.percent,
            cancel_enabled: self.run == RunState::Running
                && active_strategy.is_some_and(Strategy::polls_cancellation),
            progress_enabled: active_strategy.is_some_and(Strategy::reports_progress),
            lines: self.lines.iter().map(format_result_line).collect(),
            status: self.status.clone(),
            dirty: self.dirty,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub fn results(&self) -> &[ResultLine] {
        &self.lines
    }

    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_run(&mut self, strategy: Strategy) {
        self.run = RunState::Running;
        self.strategy = Some(strategy);
        self.lines.clear();
        self.status.clear();
        self.percent = 0;
        self.last_run = None;
        self.mark_dirty();
    }

    pub(crate) fn begin_cancel(&mut self) {
        self.run = RunState::Cancelling;
        self.status.push("Cancellation requested.".to_string());
        self.mark_dirty();
    }

    pub(crate) fn apply_progress(&mut self, percent: u8, lines: Vec<ResultLine>) {
        self.percent = percent.min(100);
        self.lines = lines;
        self.mark_dirty();
    }

    pub(crate) fn finish_completed(&mut self, lines: Vec<ResultLine>, elapsed_ms: u128) {
        self.lines = lines;
        self.percent = 100;
        self.finish(RunEnd::Completed, elapsed_ms);
    }

    pub(crate) fn finish_cancelled(&mut self, lines: Vec<ResultLine>, elapsed_ms: u128) {
        self.lines = lines;
        self.status.push("Download cancelled.".to_string());
        self.finish(RunEnd::Cancelled, elapsed_ms);
    }

    pub(crate) fn finish_failed(&mut self, message: String, elapsed_ms: u128) {
        // A failed run has no usable partial list.
        self.lines.clear();
        self.percent = 0;
        self.status.push(format!("Download failed: {message}"));
        self.finish(RunEnd::Failed(message), elapsed_ms);
    }

    pub(crate) fn request_quit(&mut self) {
        self.quitting = true;
        self.mark_dirty();
    }

    fn finish(&mut self, end: RunEnd, elapsed_ms: u128) {
        self.run = RunState::Idle;
        if let Some(strategy) = self.strategy {
            self.last_run = Some(RunSummary {
                strategy,
                end,
                elapsed_ms,
            });
        }
        self.status
            .push(format!("Total execution time: {elapsed_ms} ms"));
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
