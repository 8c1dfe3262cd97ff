//! Pipeline configuration from environment variables

use std::env;

/// Default `go movetime` per evaluated position, in milliseconds.
pub const DEFAULT_MOVETIME_MS: u64 = 300;

const DEFAULT_ENGINE_PATH: &str = "/usr/local/bin/stockfish";

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Path to the UCI engine binary
    pub engine_path: String,

    /// Movetime per position when the caller does not override it
    pub default_movetime_ms: u64,
}

impl PipelineConfig {
    /// Load configuration from environment variables, with defaults.
    pub fn from_env() -> Self {
        let engine_path =
            env::var("STOCKFISH_PATH").unwrap_or_else(|_| DEFAULT_ENGINE_PATH.to_string());

        let default_movetime_ms = env::var("MOVETIME_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MOVETIME_MS);

        Self {
            engine_path,
            default_movetime_ms,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            engine_path: DEFAULT_ENGINE_PATH.to_string(),
            default_movetime_ms: DEFAULT_MOVETIME_MS,
        }
    }
}
