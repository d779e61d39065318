pub mod checkpoint;
pub mod config;
pub mod error;
pub mod inference;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod table;

pub use checkpoint::{CheckpointPattern, CheckpointRecord, EpochOrdering, list_checkpoints, select_top_n};
pub use config::EvalConfig;
pub use error::{EvalError, Result};
pub use pipeline::driver::{CheckpointOutcome, EvalState, EvaluationDriver};
