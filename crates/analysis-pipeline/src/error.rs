//! Pipeline error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Command issued on a session that was never initialized, or one
    /// that has already been disposed.
    #[error("engine not initialized")]
    EngineNotInitialized,

    /// Worker failed to start or the engine binary is missing. Absorbed
    /// at the session boundary; evaluations degrade to null fields.
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Malformed PGN or an illegal move in the replay. Fatal for the run.
    #[error("invalid game notation: {0}")]
    InvalidGameNotation(String),
}
