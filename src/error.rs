//! Error types for the delay scheduler.
//!
//! Scheduling outcomes (rejected events, unknown cancellations) are plain
//! return values, not errors. This type only covers infrastructure failures:
//! configuration, thread spawning and I/O.

/// Top-level error type for the scheduler and its execution facilities.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Configuration parse or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Worker thread could not be spawned.
    #[error("thread error: {0}")]
    Thread(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SchedulerError>;
