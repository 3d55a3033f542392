//! Engine-independent copies of live game state.
//!
//! The engine is reached only through [`GameSource`]: once per tick the
//! telemetry thread asks for a [`GameSnapshot`] and never touches engine
//! globals directly.

pub mod run_history;
pub mod source;
pub mod types;

pub use run_history::{
    load_run_history, parse_run_history, GameStats, RunOutcome, RunRecord, RESULT_ESCAPED,
    RESULT_MASTERED,
};
pub use source::{EngineCommand, GameSource, JsonLinesSource};
pub use types::*;
