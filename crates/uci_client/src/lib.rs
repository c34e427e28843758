//! # uci_client - Asynchronous UCI Engine Driver
//!
//! A subprocess-backed client for the Universal Chess Interface line
//! protocol. The driver spawns the configured engine executable with
//! captured pipes, completes the `uci`/`uciok` handshake (harvesting
//! the engine's identity and option schema on the way), and then
//! mediates single-flight request/response exchanges: each request
//! holds a send lock across "send + wait", completes on a sentinel
//! line, and races a per-request deadline.
//!
//! ## Module Organization
//!
//! - **[`driver`]** - Process lifecycle and the request protocol
//! - **[`options`]** - `option name … type …` schema parsing
//! - **[`best_move`]** - `bestmove`/`info score` reply parsing
//! - **[`error`]** - The driver's error taxonomy
//!
//! ## Concurrency model
//!
//! All request operations are cooperative-async and suspend only at
//! the send lock and at the sentinel/timeout race. Line delivery runs
//! on background read tasks and is safe against concurrent request
//! waiting; a child-process exit resolves any pending wait as failure
//! so callers never hang.

pub mod best_move;
pub mod driver;
pub mod error;
pub mod options;

pub use best_move::{BestMove, Score};
pub use driver::{DriverState, EngineConfig, UciEngine};
pub use error::{EngineError, EngineResult};
pub use options::{OptionValue, UciOption};
