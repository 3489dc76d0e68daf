use downloader_core::{AppViewModel, RunState};

const BAR_WIDTH: usize = 30;

/// Renders a view model as terminal lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut out = Vec::new();

    let title = view.strategy.map_or("no run yet", |s| s.label());
    let state = match view.run {
        RunState::Idle => "idle",
        RunState::Running => "running",
        RunState::Cancelling => "cancelling",
    };
    out.push(format!("== {title} [{state}] =="));

    if view.progress_enabled {
        out.push(progress_bar(view.percent));
    }
    out.extend(view.lines.iter().cloned());
    out.extend(view.status.iter().cloned());

    if view.cancel_enabled {
        out.push("(c + Enter to cancel)".to_string());
    }
    out
}

pub fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}
