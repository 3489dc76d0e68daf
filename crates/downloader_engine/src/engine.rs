use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_info};

use crate::progress::{CancelAfterSink, ChannelProgressSink};
use crate::{
    BlockingFetcher, CancellationSignal, EngineConfig, EngineError, EngineEvent, Fetcher,
    OrchestrationEngine, RunId, Strategy,
};

enum EngineCommand {
    Start {
        run_id: RunId,
        strategy: Strategy,
        cancel: CancellationSignal,
        cancel_after: Option<usize>,
    },
}

struct ActiveRun {
    run_id: RunId,
    cancel: CancellationSignal,
}

/// Handle to the background engine thread.
///
/// Runs are started over a command channel and report back through
/// [`EngineEvent`]s; cancellation goes straight to the active run's signal.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    active: Arc<Mutex<Option<ActiveRun>>>,
    next_run_id: Arc<AtomicU64>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let engine = OrchestrationEngine::new(&config);
        Self::spawn(engine, config.urls)
    }

    pub fn with_fetchers(
        config: EngineConfig,
        fetcher: Arc<dyn Fetcher>,
        blocking_fetcher: Arc<dyn BlockingFetcher>,
    ) -> Result<Self, EngineError> {
        let engine =
            OrchestrationEngine::with_fetchers(fetcher, blocking_fetcher, config.parallel_workers);
        Self::spawn(engine, config.urls)
    }

    fn spawn(engine: OrchestrationEngine, urls: Vec<String>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let active: Arc<Mutex<Option<ActiveRun>>> = Arc::new(Mutex::new(None));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("downloader-runtime")
            .build()?;
        let engine = Arc::new(engine);
        let urls: Arc<[String]> = urls.into();
        let active_runs = active.clone();

        thread::Builder::new()
            .name("downloader-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let engine = engine.clone();
                    let urls = urls.clone();
                    let event_tx = event_tx.clone();
                    let active_runs = active_runs.clone();
                    runtime.spawn(async move {
                        handle_command(&engine, &urls, command, event_tx, &active_runs).await;
                    });
                }
                engine_debug!("engine command channel closed");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            active,
            next_run_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Queues a run with a fresh cancellation signal and returns its id.
    ///
    /// The new run becomes the target of [`EngineHandle::cancel`].
    pub fn start(&self, strategy: Strategy) -> RunId {
        self.launch(strategy, None)
    }

    /// Like [`EngineHandle::start`], but the run's signal is triggered as the
    /// `snapshots`-th progress snapshot is reported. Zero triggers it before
    /// the run begins.
    pub fn start_cancelling_after(&self, strategy: Strategy, snapshots: usize) -> RunId {
        self.launch(strategy, Some(snapshots))
    }

    fn launch(&self, strategy: Strategy, cancel_after: Option<usize>) -> RunId {
        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationSignal::new();
        if cancel_after == Some(0) {
            cancel.trigger();
        }
        *lock(&self.active) = Some(ActiveRun {
            run_id,
            cancel: cancel.clone(),
        });
        let _ = self.cmd_tx.send(EngineCommand::Start {
            run_id,
            strategy,
            cancel,
            cancel_after,
        });
        run_id
    }

    /// Triggers the active run's signal. Returns `false` if no run is active.
    pub fn cancel(&self) -> bool {
        match lock(&self.active).as_ref() {
            Some(run) => {
                engine_info!("cancel requested for run {}", run.run_id);
                run.cancel.trigger();
                true
            }
            None => false,
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        lock(&self.event_rx).try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        lock(&self.event_rx).recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    engine: &OrchestrationEngine,
    urls: &[String],
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    active: &Mutex<Option<ActiveRun>>,
) {
    match command {
        EngineCommand::Start {
            run_id,
            strategy,
            cancel,
            cancel_after,
        } => {
            let channel = ChannelProgressSink::new(run_id, event_tx.clone());
            let started = Instant::now();
            let result = match cancel_after {
                Some(after) if after > 0 => {
                    let sink = CancelAfterSink::new(&channel, &cancel, after);
                    engine.run(urls, strategy, &cancel, &sink).await
                }
                _ => engine.run(urls, strategy, &cancel, &channel).await,
            };
            let elapsed = started.elapsed();

            {
                let mut active = lock(active);
                if active.as_ref().is_some_and(|run| run.run_id == run_id) {
                    *active = None;
                }
            }

            let _ = event_tx.send(EngineEvent::RunFinished {
                run_id,
                strategy,
                elapsed,
                result,
            });
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
