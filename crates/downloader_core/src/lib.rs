//! Downloader core: pure state machine and view-model helpers for the shell.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, ResultLine, RunEnd, RunState, RunSummary, Strategy};
pub use update::update;
pub use view_model::{format_result_line, AppViewModel};
