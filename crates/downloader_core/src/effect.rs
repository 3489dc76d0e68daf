use crate::Strategy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRun { strategy: Strategy },
    /// Trigger the active run's cancellation signal.
    CancelRun,
    Quit,
}
