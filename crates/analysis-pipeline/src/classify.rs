/// Move quality classification — pure functions only
/// (no Board/Engine/Game dependencies)

use serde::{Deserialize, Serialize};

/// Classification thresholds (inclusive centipawn-loss upper bounds)
const THRESHOLD_BRILLIANT: i32 = 10;
const THRESHOLD_GREAT: i32 = 30;
const THRESHOLD_GOOD: i32 = 60;
const THRESHOLD_INACCURACY: i32 = 100;
const THRESHOLD_MISTAKE: i32 = 300;

/// Quality tier for a single move, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveQuality {
    Brilliant,
    Great,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl MoveQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveQuality::Brilliant => "Brilliant",
            MoveQuality::Great => "Great",
            MoveQuality::Good => "Good",
            MoveQuality::Inaccuracy => "Inaccuracy",
            MoveQuality::Mistake => "Mistake",
            MoveQuality::Blunder => "Blunder",
        }
    }
}

impl std::fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a centipawn-loss magnitude to a quality tier.
///
/// Bounds are inclusive, checked in ascending order, first match wins.
/// The input is an absolute value computed by the caller.
pub fn classify_from_cp_loss(cp_loss: i32) -> MoveQuality {
    if cp_loss <= THRESHOLD_BRILLIANT {
        MoveQuality::Brilliant
    } else if cp_loss <= THRESHOLD_GREAT {
        MoveQuality::Great
    } else if cp_loss <= THRESHOLD_GOOD {
        MoveQuality::Good
    } else if cp_loss <= THRESHOLD_INACCURACY {
        MoveQuality::Inaccuracy
    } else if cp_loss <= THRESHOLD_MISTAKE {
        MoveQuality::Mistake
    } else {
        MoveQuality::Blunder
    }
}
