use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use downloader_core::{
    update, AppState, Effect, Msg, ResultLine, RunEnd, RunState, RunSummary, Strategy,
};
use downloader_engine::EngineHandle;
use engine_logging::{engine_info, engine_warn};
use serde_json::json;

use super::cli::Cli;
use super::effects::{map_strategy, EffectRunner};
use super::ui::input::{parse_line, Input, HELP};
use super::ui::render::{progress_bar, render};
use super::{config, logging};

const EXIT_FAILED: u8 = 1;
const EXIT_CANCELLED: u8 = 130;

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::initialize(cli.log.into(), cli.verbose);

    let engine_config = config::load(cli.config.as_deref())?.into_engine_config(cli.workers);
    engine_info!(
        "Starting downloader with {} urls (workers: {:?})",
        engine_config.urls.len(),
        engine_config.parallel_workers
    );
    let engine =
        EngineHandle::new(engine_config).context("failed to start the download engine")?;

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let mut shell = Shell {
        state: AppState::new(),
        runner: EffectRunner::with_cancel_after(engine, msg_tx.clone(), cli.cancel_after),
    };

    match cli.strategy {
        Some(strategy) => shell
            .run_once(strategy.into(), &msg_rx, cli.cancel_after.is_some(), cli.json)
            .map(ExitCode::from),
        None => shell.run_interactive(msg_tx, &msg_rx),
    }
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
}

impl Shell {
    /// Applies a message and runs its effects. Returns `true` once the shell should exit.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        let quit = effects.contains(&Effect::Quit);
        self.runner.enqueue(effects);
        quit
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            println!();
            for line in render(&self.state.view()) {
                println!("{line}");
            }
        }
    }

    fn run_interactive(
        &mut self,
        msg_tx: mpsc::Sender<Msg>,
        msg_rx: &mpsc::Receiver<Msg>,
    ) -> anyhow::Result<ExitCode> {
        print_help();
        spawn_input_thread(msg_tx.clone());

        // Background tick to throttle rendering.
        thread::spawn(move || {
            let interval = Duration::from_millis(75);
            while msg_tx.send(Msg::Tick).is_ok() {
                thread::sleep(interval);
            }
        });

        while let Ok(msg) = msg_rx.recv() {
            let tick = matches!(msg, Msg::Tick);
            if self.dispatch(msg) {
                self.render_if_dirty();
                break;
            }
            if tick {
                self.render_if_dirty();
            }
        }
        engine_info!("Shell exiting");
        Ok(ExitCode::SUCCESS)
    }

    /// Runs one strategy to its end and returns the process exit status.
    ///
    /// Cancel-after counting happens in the engine, on the thread that
    /// reports the snapshot, so the signal is set before the next item starts.
    fn run_once(
        &mut self,
        strategy: Strategy,
        msg_rx: &mpsc::Receiver<Msg>,
        cancel_requested: bool,
        json: bool,
    ) -> anyhow::Result<u8> {
        if cancel_requested && !strategy.polls_cancellation() {
            engine_warn!("{} does not observe cancellation", strategy.label());
        }

        self.dispatch(Msg::RunRequested(strategy));

        while self.state.run_state() != RunState::Idle {
            let msg = msg_rx
                .recv()
                .context("engine event stream closed during the run")?;
            let is_progress = matches!(msg, Msg::Progress { .. });
            self.dispatch(msg);
            if is_progress && !json {
                println!("{}", progress_bar(self.state.view().percent));
            }
        }

        let summary = self
            .state
            .last_run()
            .cloned()
            .context("run finished without a summary")?;
        if json {
            println!("{:#}", summary_json(&summary, self.state.results()));
        } else {
            self.render_if_dirty();
        }

        Ok(exit_status(&summary.end))
    }
}

fn exit_status(end: &RunEnd) -> u8 {
    match end {
        RunEnd::Completed => 0,
        RunEnd::Cancelled => EXIT_CANCELLED,
        RunEnd::Failed(_) => EXIT_FAILED,
    }
}

fn spawn_input_thread(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    engine_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            match parse_line(&line) {
                Input::Msg(msg) => {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
                Input::Help => print_help(),
                Input::Empty => {}
                Input::Unknown(command) => println!("Unknown command '{command}' (h for help)"),
            }
        }
        // End of input quits.
        let _ = msg_tx.send(Msg::QuitRequested);
    });
}

fn print_help() {
    for line in HELP {
        println!("{line}");
    }
}

fn summary_json(summary: &RunSummary, results: &[ResultLine]) -> serde_json::Value {
    let (outcome, error) = match &summary.end {
        RunEnd::Completed => ("completed", None),
        RunEnd::Cancelled => ("cancelled", None),
        RunEnd::Failed(message) => ("failed", Some(message.as_str())),
    };
    let results: Vec<_> = results
        .iter()
        .map(|line| json!({ "url": line.url, "length": line.chars, "error": line.error }))
        .collect();
    json!({
        "strategy": map_strategy(summary.strategy).name(),
        "outcome": outcome,
        "elapsed_ms": u64::try_from(summary.elapsed_ms).unwrap_or(u64::MAX),
        "error": error,
        "results": results,
    })
}
