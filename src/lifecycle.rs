//! Worker thread lifecycle shared by the scheduler and the dispatcher.

/// Lifecycle of a worker thread. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadState {
    /// Accepting work.
    #[default]
    Running,
    /// Shut down; new work is rejected and pending work has been dropped.
    Terminated,
}

impl ThreadState {
    /// Returns `true` while work is accepted.
    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

impl std::fmt::Display for ThreadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}
