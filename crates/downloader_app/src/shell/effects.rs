use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use downloader_core::{Effect, Msg, ResultLine, Strategy};
use downloader_engine::{EngineEvent, EngineHandle, FetchResult, RunOutcome};
use engine_logging::{engine_info, engine_warn};

/// Executes core effects against the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    cancel_after: Option<usize>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self::with_cancel_after(engine, msg_tx, None)
    }

    /// Runs started through this runner cancel themselves once `cancel_after`
    /// progress snapshots have been reported.
    pub fn with_cancel_after(
        engine: EngineHandle,
        msg_tx: mpsc::Sender<Msg>,
        cancel_after: Option<usize>,
    ) -> Self {
        let runner = Self {
            engine,
            cancel_after,
        };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun { strategy } => {
                    let engine_strategy = map_strategy(strategy);
                    let run_id = match self.cancel_after {
                        Some(after) => self.engine.start_cancelling_after(engine_strategy, after),
                        None => self.engine.start(engine_strategy),
                    };
                    engine_info!("StartRun run_id={} strategy={}", run_id, strategy.label());
                }
                Effect::CancelRun => {
                    if !self.engine.cancel() {
                        engine_warn!("CancelRun with no active run");
                    }
                }
                Effect::Quit => {
                    // handled by the shell loop
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        });
    }
}

pub(super) fn map_strategy(strategy: Strategy) -> downloader_engine::Strategy {
    match strategy {
        Strategy::SequentialBlocking => downloader_engine::Strategy::SequentialBlocking,
        Strategy::ParallelBlocking => downloader_engine::Strategy::ParallelBlocking,
        Strategy::CooperativeSequential => downloader_engine::Strategy::CooperativeSequential,
        Strategy::CooperativeParallel => downloader_engine::Strategy::CooperativeParallel,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { snapshot, .. } => Msg::Progress {
            percent: snapshot.percent_complete(),
            lines: to_lines(snapshot.completed()),
        },
        EngineEvent::RunFinished {
            run_id,
            strategy,
            elapsed,
            result,
        } => {
            let elapsed_ms = elapsed.as_millis();
            match result {
                Ok(RunOutcome::Completed(results)) => Msg::RunCompleted {
                    lines: to_lines(&results),
                    elapsed_ms,
                },
                Ok(RunOutcome::Cancelled(results)) => Msg::RunCancelled {
                    lines: to_lines(&results),
                    elapsed_ms,
                },
                Err(err) => {
                    engine_warn!("Run {} ({}) failed: {}", run_id, strategy, err);
                    Msg::RunFailed {
                        message: err.to_string(),
                        elapsed_ms,
                    }
                }
            }
        }
    }
}

fn to_lines(results: &[FetchResult]) -> Vec<ResultLine> {
    results
        .iter()
        .map(|result| ResultLine {
            url: result.url().to_string(),
            chars: result.len(),
            error: result.error().map(str::to_string),
        })
        .collect()
}
