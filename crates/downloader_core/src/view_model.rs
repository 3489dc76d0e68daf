use crate::{ResultLine, RunState, Strategy};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub run: RunState,
    pub strategy: Option<Strategy>,
    pub percent: u8,
    pub cancel_enabled: bool,
    pub progress_enabled: bool,
    pub lines: Vec<String>,
    pub status: Vec<String>,
    pub dirty: bool,
}

pub fn format_result_line(line: &ResultLine) -> String {
    match &line.error {
        Some(error) => format!("{} failed: {}", line.url, error),
        None => format!(
            "{} downloaded: {} characters long.",
            line.url, line.chars
        ),
    }
}
