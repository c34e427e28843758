//! Error types for the UCI driver
//!
//! Every failure the driver can observe surfaces as one of these
//! variants; the driver itself never panics and never takes the
//! process down. A timed-out or failed request leaves the driver
//! usable for the next one, except for [`EngineError::Exited`], after
//! which only [`crate::UciEngine::start`] helps.

use std::io;
use thiserror::Error;

/// Errors that can occur while driving the engine process.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The executable is missing, unreadable, or failed to spawn.
    #[error("engine unavailable: {reason}")]
    Unavailable { reason: String },

    /// No request is possible because the engine was never started or
    /// has already been stopped.
    #[error("engine is not running")]
    NotRunning,

    /// The expected sentinel line was not observed within the deadline.
    #[error("engine did not answer '{command}' within {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    /// The engine process exited while a request was waiting.
    #[error("engine process exited while a request was pending")]
    Exited,

    /// A reply line matched the sentinel but could not be parsed.
    #[error("unexpected engine reply: {line}")]
    Protocol { line: String },

    /// Writing to or flushing the engine's stdin failed.
    #[error("engine I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for driver operations.
pub type EngineResult<T> = Result<T, EngineError>;
