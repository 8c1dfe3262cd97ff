//! Persona scoring — fixed heuristics over the annotated move list
//!
//! Nine behavioral styles, each scored by an independent heuristic and
//! ranked descending. Runs entirely on the orchestrator's output; no
//! engine dependency.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::classify::MoveQuality;
use crate::replay::AnnotatedMove;

/// A move made with less than this much thought counts as rushed.
const LOW_TIME_MS: u64 = 5_000;

/// Plies at or below this bound are the opening.
const OPENING_PLIES: u32 = 24;

/// Plies beyond this bound are the endgame.
const ENDGAME_PLIES: u32 = 60;

/// Plies beyond this bound count toward a late-game collapse.
const LATE_GAME_PLIES: u32 = 40;

/// The nine behavioral styles, in fixed enumeration order.
/// Ranking ties resolve to this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "Time Scrambler")]
    TimeScrambler,
    #[serde(rename = "Tactician")]
    Tactician,
    #[serde(rename = "Endgame Specialist")]
    EndgameSpecialist,
    #[serde(rename = "Opening Scholar")]
    OpeningScholar,
    #[serde(rename = "Positional Player")]
    PositionalPlayer,
    #[serde(rename = "Aggressive Attacker")]
    AggressiveAttacker,
    #[serde(rename = "Defensive Wall")]
    DefensiveWall,
    #[serde(rename = "Comeback Kid")]
    ComebackKid,
    #[serde(rename = "Tilt Master")]
    TiltMaster,
}

impl Persona {
    pub const ALL: [Persona; 9] = [
        Persona::TimeScrambler,
        Persona::Tactician,
        Persona::EndgameSpecialist,
        Persona::OpeningScholar,
        Persona::PositionalPlayer,
        Persona::AggressiveAttacker,
        Persona::DefensiveWall,
        Persona::ComebackKid,
        Persona::TiltMaster,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Persona::TimeScrambler => "Time Scrambler",
            Persona::Tactician => "Tactician",
            Persona::EndgameSpecialist => "Endgame Specialist",
            Persona::OpeningScholar => "Opening Scholar",
            Persona::PositionalPlayer => "Positional Player",
            Persona::AggressiveAttacker => "Aggressive Attacker",
            Persona::DefensiveWall => "Defensive Wall",
            Persona::ComebackKid => "Comeback Kid",
            Persona::TiltMaster => "Tilt Master",
        }
    }

    /// One heuristic per variant, exhaustively matched.
    ///
    /// Total over an empty list: every data-driven persona scores 0 and
    /// Comeback Kid keeps its fixed 50 baseline.
    fn score(self, moves: &[AnnotatedMove]) -> f64 {
        match self {
            // Needs game-result history to refine; fixed baseline for now
            Persona::ComebackKid => 50.0,
            _ if moves.is_empty() => 0.0,
            Persona::TimeScrambler => {
                let rushed_blunders = moves
                    .iter()
                    .filter(|m| {
                        m.quality == MoveQuality::Blunder
                            && m.time_spent_ms.unwrap_or(0) < LOW_TIME_MS
                    })
                    .count();
                rushed_blunders as f64 / moves.len() as f64 * 100.0
            }
            Persona::Tactician => 50.0 - count_quality(moves, MoveQuality::Inaccuracy) as f64,
            Persona::EndgameSpecialist => {
                eval_calm(moves.iter().filter(|m| m.move_number > ENDGAME_PLIES))
            }
            Persona::OpeningScholar => {
                eval_calm(moves.iter().filter(|m| m.move_number <= OPENING_PLIES))
            }
            Persona::PositionalPlayer => eval_calm(moves.iter()),
            Persona::AggressiveAttacker => {
                50.0 + count_quality(moves, MoveQuality::Mistake) as f64
                    - count_quality(moves, MoveQuality::Inaccuracy) as f64
            }
            Persona::DefensiveWall => 50.0 - count_quality(moves, MoveQuality::Blunder) as f64,
            Persona::TiltMaster => {
                let late_collapses = moves
                    .iter()
                    .filter(|m| {
                        m.move_number > LATE_GAME_PLIES
                            && matches!(m.quality, MoveQuality::Mistake | MoveQuality::Blunder)
                    })
                    .count();
                late_collapses as f64 / moves.len() as f64 * 100.0
            }
        }
    }
}

/// A persona with its computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaScore {
    pub persona: Persona,
    pub score: f64,
}

/// Summary row from a previously stored analysis. Read by the scorer but
/// not folded into any heuristic yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub result: Option<String>,
    pub accuracy: Option<f64>,
}

/// Score all nine personas over an annotated move list.
///
/// Always returns nine entries sorted descending by score; equal scores
/// keep the fixed enumeration order (stable sort).
pub fn compute_personas(
    moves: &[AnnotatedMove],
    _prior: Option<&AnalysisSummary>,
) -> Vec<PersonaScore> {
    let mut ranked: Vec<PersonaScore> = Persona::ALL
        .iter()
        .map(|&persona| PersonaScore {
            persona,
            score: persona.score(moves),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

fn count_quality(moves: &[AnnotatedMove], quality: MoveQuality) -> usize {
    moves.iter().filter(|m| m.quality == quality).count()
}

/// 100 minus half the average absolute evaluation, floored at 0: quiet
/// evaluations read as controlled play. Empty selections average to 0.
fn eval_calm<'a>(moves: impl Iterator<Item = &'a AnnotatedMove>) -> f64 {
    let (sum, count) = moves.fold((0.0_f64, 0u32), |(sum, count), m| {
        (sum + m.eval_cp.unwrap_or(0).abs() as f64, count + 1)
    });
    let avg = if count == 0 { 0.0 } else { sum / count as f64 };
    (100.0 - avg / 2.0).max(0.0)
}
