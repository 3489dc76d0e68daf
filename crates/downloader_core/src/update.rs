use crate::{AppState, Effect, Msg, RunState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RunRequested(strategy) => {
            // One run at a time.
            if state.run_state() != RunState::Idle || state.is_quitting() {
                return (state, Vec::new());
            }
            state.begin_run(strategy);
            vec![Effect::StartRun { strategy }]
        }
        Msg::CancelRequested => {
            let polls = state.strategy().is_some_and(|s| s.polls_cancellation());
            if state.run_state() == RunState::Running && polls {
                state.begin_cancel();
                vec![Effect::CancelRun]
            } else {
                Vec::new()
            }
        }
        Msg::Progress { percent, lines } => {
            if state.run_state() != RunState::Idle {
                state.apply_progress(percent, lines);
            }
            Vec::new()
        }
        Msg::RunCompleted { lines, elapsed_ms } => {
            state.finish_completed(lines, elapsed_ms);
            Vec::new()
        }
        Msg::RunCancelled { lines, elapsed_ms } => {
            state.finish_cancelled(lines, elapsed_ms);
            Vec::new()
        }
        Msg::RunFailed {
            message,
            elapsed_ms,
        } => {
            state.finish_failed(message, elapsed_ms);
            Vec::new()
        }
        Msg::QuitRequested => {
            let cancel_first = state.run_state() == RunState::Running
                && state.strategy().is_some_and(|s| s.polls_cancellation());
            state.request_quit();
            if cancel_first {
                vec![Effect::CancelRun, Effect::Quit]
            } else {
                vec![Effect::Quit]
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
