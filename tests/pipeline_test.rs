//! Integration tests: replay pipeline against a scripted evaluator.
//!
//! The evaluator stub replays a fixed sequence of evaluations, one per
//! `analyze_fen` call, in the order the orchestrator makes them
//! (before/after for each ply).

use analysis_pipeline::classify::MoveQuality;
use analysis_pipeline::engine::EngineEvaluation;
use analysis_pipeline::error::PipelineError;
use analysis_pipeline::persona::{compute_personas, Persona};
use analysis_pipeline::replay::{analyze_game, PositionEvaluator};
use game_core::pgn::parse_pgn;

/// Evaluator that hands out a fixed script of evaluations.
struct ScriptedEvaluator {
    script: Vec<EngineEvaluation>,
    cursor: usize,
}

impl ScriptedEvaluator {
    fn from_cps(cps: &[Option<i32>]) -> Self {
        Self {
            script: cps
                .iter()
                .map(|&cp| EngineEvaluation {
                    cp,
                    mate: None,
                    best_move: Some("e2e4".to_string()),
                })
                .collect(),
            cursor: 0,
        }
    }
}

impl PositionEvaluator for ScriptedEvaluator {
    async fn analyze_fen(
        &mut self,
        _fen: &str,
        _movetime_ms: u64,
    ) -> Result<EngineEvaluation, PipelineError> {
        let eval = self.script.get(self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        Ok(eval)
    }
}

#[tokio::test]
async fn one_move_game_with_flat_eval_is_brilliant() {
    let game = parse_pgn("1. e4 *").unwrap();
    let mut engine = ScriptedEvaluator::from_cps(&[Some(0), Some(0)]);

    let moves = analyze_game(&mut engine, &game, 300).await.unwrap();
    assert_eq!(moves.len(), 1);

    let mv = &moves[0];
    assert_eq!(mv.move_number, 1);
    assert_eq!(mv.san, "e4");
    assert_eq!(mv.uci.as_deref(), Some("e2e4"));
    assert_eq!(mv.color, 'w');
    assert_eq!(mv.cp_loss, 0);
    assert_eq!(mv.quality, MoveQuality::Brilliant);
    assert_eq!(mv.eval_cp, Some(0));
    assert_eq!(mv.best_move_uci.as_deref(), Some("e2e4"));
    assert_eq!(
        mv.fen_after,
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1"
    );
}

#[tokio::test]
async fn large_eval_swing_is_a_blunder() {
    let game = parse_pgn("1. e4 *").unwrap();
    let mut engine = ScriptedEvaluator::from_cps(&[Some(-20), Some(-370)]);

    let moves = analyze_game(&mut engine, &game, 300).await.unwrap();
    assert_eq!(moves[0].cp_loss, 350);
    assert_eq!(moves[0].quality, MoveQuality::Blunder);
}

#[tokio::test]
async fn every_ply_is_annotated_in_order() {
    let game = parse_pgn("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 *").unwrap();
    let cps: Vec<Option<i32>> = (0..12).map(|i| Some(i * 10)).collect();
    let mut engine = ScriptedEvaluator::from_cps(&cps);

    let moves = analyze_game(&mut engine, &game, 300).await.unwrap();
    assert_eq!(moves.len(), 6);
    for (i, mv) in moves.iter().enumerate() {
        assert_eq!(mv.move_number, (i + 1) as u32);
    }
    // Sides alternate starting with white
    let colors: Vec<char> = moves.iter().map(|m| m.color).collect();
    assert_eq!(colors, vec!['w', 'b', 'w', 'b', 'w', 'b']);
}

#[tokio::test]
async fn analysis_is_deterministic_for_a_fixed_script() {
    let game = parse_pgn("1. d4 d5 2. c4 e6 *").unwrap();
    let cps: Vec<Option<i32>> = vec![
        Some(20),
        Some(25),
        Some(-15),
        Some(30),
        Some(10),
        Some(-80),
        Some(40),
        Some(0),
    ];

    let mut first = ScriptedEvaluator::from_cps(&cps);
    let mut second = ScriptedEvaluator::from_cps(&cps);

    let a = analyze_game(&mut first, &game, 300).await.unwrap();
    let b = analyze_game(&mut second, &game, 300).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn degraded_evaluations_still_annotate() {
    let game = parse_pgn("1. e4 e5 *").unwrap();
    let mut engine = ScriptedEvaluator::from_cps(&[None, None, None, None]);

    let moves = analyze_game(&mut engine, &game, 300).await.unwrap();
    assert_eq!(moves.len(), 2);
    for mv in &moves {
        assert_eq!(mv.eval_cp, None);
        // Absent cp counts as 0, so the loss bottoms out
        assert_eq!(mv.cp_loss, 0);
        assert_eq!(mv.quality, MoveQuality::Brilliant);
    }
}

#[tokio::test]
async fn illegal_move_aborts_the_run() {
    // 1... e5 is impossible after 1. e4 e5 2. e5
    let game = parse_pgn("1. e4 e5 2. e5 *").unwrap();
    let mut engine = ScriptedEvaluator::from_cps(&[Some(0); 6]);

    let err = analyze_game(&mut engine, &game, 300).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidGameNotation(_)));
}

#[tokio::test]
async fn persona_ranking_runs_on_pipeline_output() {
    let game = parse_pgn("1. e4 e5 2. Nf3 Nc6 *").unwrap();
    let mut engine = ScriptedEvaluator::from_cps(&[Some(0); 8]);

    let moves = analyze_game(&mut engine, &game, 300).await.unwrap();
    let ranked = compute_personas(&moves, None);

    assert_eq!(ranked.len(), 9);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    // Flat evals: calm-play personas max out at 100
    assert_eq!(ranked[0].persona, Persona::EndgameSpecialist);
    assert_eq!(ranked[0].score, 100.0);
}
