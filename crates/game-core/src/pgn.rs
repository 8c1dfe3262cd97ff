//! PGN parsing utilities — lightweight regex-based parser.
//!
//! Extracts headers, SAN moves, and per-move clock comments. Think time
//! per move is derived from consecutive same-side `%clk` readings plus
//! the TimeControl increment when both are available.

use regex::Regex;
use thiserror::Error;

use crate::game_data::{GameData, GameMetadata, MoveRecord};

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug)]
pub enum GameError {
    #[error("no moves found in PGN")]
    EmptyGame,

    #[error("non-standard starting position")]
    NonStandardStart,
}

/// Parse a PGN string into a GameData struct.
///
/// Games from a non-initial starting position are rejected; so are games
/// whose movetext yields no parseable moves.
pub fn parse_pgn(pgn: &str) -> Result<GameData, GameError> {
    // Extract headers
    let header_re = Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).unwrap();

    let mut white = "Unknown".to_string();
    let mut black = "Unknown".to_string();
    let mut result = "*".to_string();
    let mut date = None;
    let mut time_control = None;
    let mut eco = None;
    let mut event = None;
    let mut link = None;
    let mut setup = None;
    let mut fen = None;

    for cap in header_re.captures_iter(pgn) {
        let key = &cap[1];
        let value = cap[2].to_string();
        match key {
            "White" => white = value,
            "Black" => black = value,
            "Result" => result = value,
            "Date" => date = Some(value),
            "TimeControl" => time_control = Some(value),
            "ECO" => eco = Some(value),
            "Event" => event = Some(value),
            "Link" => link = Some(value),
            "SetUp" => setup = Some(value),
            "FEN" => fen = Some(value),
            _ => {}
        }
    }

    // Filter non-standard positions
    if setup.as_deref() == Some("1") {
        if let Some(ref f) = fen {
            if f != STANDARD_START_FEN {
                return Err(GameError::NonStandardStart);
            }
        }
    }

    let mut moves = extract_move_records(pgn);
    if moves.is_empty() {
        return Err(GameError::EmptyGame);
    }

    derive_think_times(&mut moves, time_control.as_deref());

    let metadata = GameMetadata {
        white,
        black,
        result,
        date,
        time_control,
        eco,
        event,
        link,
    };

    Ok(GameData {
        metadata,
        moves,
        pgn: pgn.to_string(),
    })
}

/// Extract SAN moves and clock comments from PGN text.
///
/// Header lines and variations are stripped first; comments stay in place
/// so a `%clk` annotation attaches to the move it follows.
fn extract_move_records(pgn: &str) -> Vec<MoveRecord> {
    // Remove header lines (line-anchored so [%clk ...] comments survive)
    let header_re = Regex::new(r#"(?m)^\s*\[\w+\s+"[^"]*"\]\s*$"#).unwrap();
    let no_headers = header_re.replace_all(pgn, "");

    // Remove variations
    let variation_re = Regex::new(r"\([^)]*\)").unwrap();
    let movetext = variation_re.replace_all(&no_headers, "");

    // Tokenize: comments interleaved with SAN moves
    let token_re =
        Regex::new(r"\{[^}]*\}|[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O")
            .unwrap();

    let mut records: Vec<MoveRecord> = Vec::new();
    for token in token_re.find_iter(&movetext) {
        let text = token.as_str();
        if text.starts_with('{') {
            if let Some(clock_ms) = parse_clock_ms(text) {
                if let Some(last) = records.last_mut() {
                    last.clock_ms = Some(clock_ms);
                }
            }
        } else {
            records.push(MoveRecord {
                san: text.to_string(),
                clock_ms: None,
                time_spent_ms: None,
            });
        }
    }

    records
}

/// Parse a `[%clk H:MM:SS(.t)]` annotation into milliseconds remaining.
fn parse_clock_ms(comment: &str) -> Option<u64> {
    let clk_re = Regex::new(r"\[%clk\s+(\d+):(\d+):(\d+(?:\.\d+)?)\]").unwrap();
    let cap = clk_re.captures(comment)?;
    let hours: u64 = cap[1].parse().ok()?;
    let minutes: u64 = cap[2].parse().ok()?;
    let seconds: f64 = cap[3].parse().ok()?;
    Some(hours * 3_600_000 + minutes * 60_000 + (seconds * 1000.0).round() as u64)
}

/// Fill `time_spent_ms` from same-side clock deltas.
///
/// Elapsed = previous clock + increment - current clock, floored at zero.
/// The first move of each side uses the TimeControl base when present.
fn derive_think_times(moves: &mut [MoveRecord], time_control: Option<&str>) {
    let (base_ms, increment_ms) = parse_time_control(time_control);

    let mut prev_clock: [Option<u64>; 2] = [base_ms, base_ms];
    for (i, record) in moves.iter_mut().enumerate() {
        let side = i % 2;
        if let (Some(before), Some(after)) = (prev_clock[side], record.clock_ms) {
            record.time_spent_ms = Some((before + increment_ms).saturating_sub(after));
        }
        if record.clock_ms.is_some() {
            prev_clock[side] = record.clock_ms;
        }
    }
}

/// Parse a TimeControl header like "600" or "180+2" into (base ms, increment ms).
/// Correspondence formats ("1/259200") yield no base.
fn parse_time_control(time_control: Option<&str>) -> (Option<u64>, u64) {
    let Some(tc) = time_control else {
        return (None, 0);
    };
    let mut parts = tc.split('+');
    let base_ms = parts
        .next()
        .and_then(|b| b.parse::<u64>().ok())
        .map(|secs| secs * 1000);
    let increment_ms = parts
        .next()
        .and_then(|i| i.parse::<u64>().ok())
        .map(|secs| secs * 1000)
        .unwrap_or(0);
    (base_ms, increment_ms)
}
