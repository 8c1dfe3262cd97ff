//! PGN analysis CLI
//!
//! Replays a PGN file against a local UCI engine and prints the annotated
//! moves plus the persona ranking as JSON.

use std::path::PathBuf;

use tracing::info;

use analysis_pipeline::config::PipelineConfig;
use analysis_pipeline::persona::compute_personas;
use analysis_pipeline::replay::analyze_pgn;

struct CliArgs {
    pgn_path: PathBuf,
    movetime_ms: Option<u64>,
}

/// Parse `<game.pgn> [--movetime <ms>]` from CLI args
fn parse_args() -> Option<CliArgs> {
    let mut pgn_path = None;
    let mut movetime_ms = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--movetime" => movetime_ms = args.next().and_then(|v| v.parse().ok()),
            _ => pgn_path = Some(PathBuf::from(arg)),
        }
    }
    Some(CliArgs {
        pgn_path: pgn_path?,
        movetime_ms,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let Some(args) = parse_args() else {
        eprintln!("usage: analyze-pgn <game.pgn> [--movetime <ms>]");
        std::process::exit(2);
    };

    let config = PipelineConfig::from_env();
    let movetime_ms = args.movetime_ms.unwrap_or(config.default_movetime_ms);

    let pgn = std::fs::read_to_string(&args.pgn_path)?;
    info!(path = %args.pgn_path.display(), movetime_ms, "analyzing game");

    let moves = analyze_pgn(&pgn, movetime_ms, &config).await?;
    let personas = compute_personas(&moves, None);

    let report = serde_json::json!({
        "moves": moves,
        "personas": personas,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
