use downloader_core::{Msg, Strategy};

/// A parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    Help,
    Empty,
    Unknown(String),
}

pub const HELP: &[&str] = &[
    "Commands:",
    "  1  sequential, blocking",
    "  2  parallel, blocking",
    "  3  async sequential (progress, cancellable)",
    "  4  async parallel (progress)",
    "  c  cancel the running download",
    "  h  show this help",
    "  q  quit",
];

pub fn parse_line(line: &str) -> Input {
    let command = line.trim().to_ascii_lowercase();
    match command.as_str() {
        "" => Input::Empty,
        "1" => Input::Msg(Msg::RunRequested(Strategy::SequentialBlocking)),
        "2" => Input::Msg(Msg::RunRequested(Strategy::ParallelBlocking)),
        "3" => Input::Msg(Msg::RunRequested(Strategy::CooperativeSequential)),
        "4" => Input::Msg(Msg::RunRequested(Strategy::CooperativeParallel)),
        "c" | "cancel" => Input::Msg(Msg::CancelRequested),
        "q" | "quit" | "exit" => Input::Msg(Msg::QuitRequested),
        "h" | "help" | "?" => Input::Help,
        _ => Input::Unknown(command),
    }
}
