//! Game analysis pipeline
//!
//! Drives one UCI engine per analysis run, replays a PGN move-by-move
//! with a before/after evaluation per ply, classifies move quality from
//! centipawn loss, and scores nine behavioral personas over the result.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod persona;
pub mod replay;

pub use classify::{classify_from_cp_loss, MoveQuality};
pub use config::PipelineConfig;
pub use engine::{EngineEvaluation, EngineSession};
pub use error::PipelineError;
pub use persona::{compute_personas, AnalysisSummary, Persona, PersonaScore};
pub use replay::{analyze_game, analyze_pgn, AnnotatedMove, PositionEvaluator};
