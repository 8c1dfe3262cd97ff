//! Game replay and dual evaluation
//!
//! Replays a parsed game on a shakmaty board, evaluating every position
//! before and after each ply to derive per-move centipawn loss. Strictly
//! sequential: the engine session is a single exclusively-owned resource,
//! so no two evaluations are ever in flight at once. Cost is 2 x plies
//! evaluations, which is why movetime-per-position is the caller's knob.

use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, san::San, CastlingMode, Chess, Color, EnPassantMode, Position};
use tracing::{debug, info};

use game_core::game_data::GameData;
use game_core::pgn;

use crate::classify::{classify_from_cp_loss, MoveQuality};
use crate::config::PipelineConfig;
use crate::engine::{EngineEvaluation, EngineSession};
use crate::error::PipelineError;

/// One replayed ply joined with its evaluations and classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedMove {
    /// 1-based ply index; the authoritative ordering downstream
    pub move_number: u32,
    pub san: String,
    /// Origin + destination + optional promotion letter
    pub uci: Option<String>,
    /// Side that moved, 'w' or 'b'
    pub color: char,
    pub time_spent_ms: Option<u64>,
    /// Evaluation after the move, side-to-move relative. None when the
    /// engine reported a forced mate or nothing at all.
    pub eval_cp: Option<i32>,
    /// Engine's suggestion in the position before the move
    pub best_move_uci: Option<String>,
    pub cp_loss: i32,
    pub quality: MoveQuality,
    pub fen_after: String,
}

/// Seam between the replay orchestrator and the engine session, so tests
/// can substitute a scripted evaluator.
#[allow(async_fn_in_trait)]
pub trait PositionEvaluator {
    async fn analyze_fen(
        &mut self,
        fen: &str,
        movetime_ms: u64,
    ) -> Result<EngineEvaluation, PipelineError>;
}

impl PositionEvaluator for EngineSession {
    async fn analyze_fen(
        &mut self,
        fen: &str,
        movetime_ms: u64,
    ) -> Result<EngineEvaluation, PipelineError> {
        EngineSession::analyze_fen(self, fen, movetime_ms).await
    }
}

/// Full pipeline for one game: parse, replay with dual evaluation,
/// classify each ply.
///
/// The engine session is created for this run alone and is always
/// disposed, even when the replay fails partway.
pub async fn analyze_pgn(
    pgn_text: &str,
    movetime_ms: u64,
    config: &PipelineConfig,
) -> Result<Vec<AnnotatedMove>, PipelineError> {
    let game = pgn::parse_pgn(pgn_text)
        .map_err(|e| PipelineError::InvalidGameNotation(e.to_string()))?;

    info!(plies = game.moves.len(), movetime_ms, "starting game analysis");

    let mut session = EngineSession::new(&config.engine_path);
    session.init().await?;
    let result = analyze_game(&mut session, &game, movetime_ms).await;
    session.dispose().await;

    if let Ok(ref moves) = result {
        info!(annotated = moves.len(), "analysis complete");
    }
    result
}

/// Replay a game against an evaluator, one before/after evaluation pair
/// per ply.
pub async fn analyze_game<E: PositionEvaluator>(
    engine: &mut E,
    game: &GameData,
    movetime_ms: u64,
) -> Result<Vec<AnnotatedMove>, PipelineError> {
    let mut pos = Chess::default();
    let mut annotated = Vec::with_capacity(game.moves.len());

    for (i, record) in game.moves.iter().enumerate() {
        let san: San = record.san.parse().map_err(|_| {
            PipelineError::InvalidGameNotation(format!("bad SAN at ply {}: {}", i + 1, record.san))
        })?;
        let mv = san.to_move(&pos).map_err(|_| {
            PipelineError::InvalidGameNotation(format!(
                "illegal move at ply {}: {}",
                i + 1,
                record.san
            ))
        })?;

        let color = if pos.turn() == Color::White { 'w' } else { 'b' };
        let uci = mv.to_uci(CastlingMode::Standard).to_string();

        let fen_before = Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string();
        let eval_before = engine.analyze_fen(&fen_before, movetime_ms).await?;

        pos.play_unchecked(&mv);
        let fen_after = Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string();
        let eval_after = engine.analyze_fen(&fen_after, movetime_ms).await?;

        // Known approximation: mate scores are not converted, and an
        // absent cp counts as 0 here.
        let cp_loss = (eval_before.cp.unwrap_or(0) - eval_after.cp.unwrap_or(0)).abs();
        let quality = classify_from_cp_loss(cp_loss);

        debug!(ply = i + 1, san = %record.san, cp_loss, quality = %quality, "annotated move");

        annotated.push(AnnotatedMove {
            move_number: (i + 1) as u32,
            san: record.san.clone(),
            uci: Some(uci),
            color,
            time_spent_ms: record.time_spent_ms,
            eval_cp: eval_after.cp,
            best_move_uci: eval_before.best_move,
            cp_loss,
            quality,
            fen_after,
        });
    }

    Ok(annotated)
}
