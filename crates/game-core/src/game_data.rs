use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub date: Option<String>,
    pub time_control: Option<String>,
    pub eco: Option<String>,
    pub event: Option<String>,
    pub link: Option<String>,
}

/// One ply as parsed from the PGN movetext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    /// SAN notation, e.g. "Nf3" or "exd5+"
    pub san: String,
    /// Clock reading after this move, from a %clk comment
    pub clock_ms: Option<u64>,
    /// Time spent on this move, derived from consecutive same-side clocks
    pub time_spent_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameData {
    pub metadata: GameMetadata,
    pub moves: Vec<MoveRecord>,
    pub pgn: String,
}
