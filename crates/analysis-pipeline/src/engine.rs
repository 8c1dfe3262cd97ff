//! UCI engine session (async I/O over a spawned worker process)
//!
//! One session wraps one engine process. The process's stdout is owned by
//! a reader task that forwards every line into a broadcast channel, so
//! any number of subscribers can observe raw engine output in receipt
//! order. An evaluation drains that channel under a timer-armed deadline
//! and parses whatever accumulated; engine silence or failure degrades to
//! an all-null result, never an error.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::PipelineError;

/// Extra wait beyond `go movetime` before an evaluation gives up.
const DEADLINE_GRACE: Duration = Duration::from_millis(200);

/// Buffered output lines per subscriber.
const OUTPUT_CAPACITY: usize = 1024;

/// Result of a single position evaluation.
///
/// `cp` and `mate` are mutually exclusive; all fields are `None` when the
/// engine produced no usable output before the deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineEvaluation {
    /// Centipawn score, side-to-move relative
    pub cp: Option<i32>,
    /// Mate in N moves (positive = side to move wins)
    pub mate: Option<i32>,
    /// Best move in UCI notation
    pub best_move: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Busy,
    Disposed,
}

struct Worker {
    child: Child,
    stdin: ChildStdin,
    reader: JoinHandle<()>,
}

/// One UCI engine instance and its command/response protocol.
///
/// A session is exclusively owned by a single analysis run; `&mut self`
/// on [`analyze_fen`](EngineSession::analyze_fen) keeps at most one
/// search in flight.
pub struct EngineSession {
    engine_path: String,
    state: SessionState,
    worker: Option<Worker>,
    output: broadcast::Sender<String>,
}

impl EngineSession {
    pub fn new(engine_path: &str) -> Self {
        let (output, _) = broadcast::channel(OUTPUT_CAPACITY);
        Self {
            engine_path: engine_path.to_string(),
            state: SessionState::Uninitialized,
            worker: None,
            output,
        }
    }

    /// Spawn the engine worker and issue the UCI handshake.
    ///
    /// Idempotent: calling it on an initialized session is a no-op. A
    /// missing or broken engine binary is absorbed: the session comes up
    /// degraded and every evaluation resolves all-null at its deadline.
    pub async fn init(&mut self) -> Result<(), PipelineError> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Disposed => return Err(PipelineError::EngineNotInitialized),
            _ => return Ok(()),
        }
        self.state = SessionState::Initializing;

        match self.spawn_worker() {
            Ok(worker) => {
                self.worker = Some(worker);
                self.send_commands(&["uci", "isready"]).await;
            }
            Err(e) => {
                warn!(error = %e, path = %self.engine_path, "engine unavailable, running degraded");
                let _ = self.output.send(format!("info string {e}"));
            }
        }

        self.state = SessionState::Ready;
        Ok(())
    }

    fn spawn_worker(&self) -> Result<Worker, PipelineError> {
        let mut child = Command::new(&self.engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PipelineError::EngineUnavailable(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PipelineError::EngineUnavailable("no stdin handle".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PipelineError::EngineUnavailable("no stdout handle".into()))?;

        let tx = self.output.clone();
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(line = %line, "engine >");
                let _ = tx.send(line);
            }
        });

        Ok(Worker {
            child,
            stdin,
            reader,
        })
    }

    /// Write commands to the worker's stdin. Write failures are absorbed:
    /// the worker is gone and the pending evaluation degrades to null.
    async fn send_commands(&mut self, cmds: &[&str]) {
        let Some(worker) = self.worker.as_mut() else {
            return;
        };
        for &cmd in cmds {
            debug!(cmd, "engine <");
            if let Err(e) = worker.stdin.write_all(format!("{cmd}\n").as_bytes()).await {
                warn!(error = %e, "engine stdin write failed");
                let _ = self.output.send(format!("info string write failed: {e}"));
                return;
            }
        }
        if let Err(e) = worker.stdin.flush().await {
            warn!(error = %e, "engine stdin flush failed");
        }
    }

    /// Subscribe to raw engine output lines.
    ///
    /// Every subscriber sees each line once, in receipt order. Dropping
    /// the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.output.subscribe()
    }

    /// Evaluate one FEN with `go movetime`.
    ///
    /// Requires a session in the ready state; the session is busy for the
    /// duration. Output is drained under a `movetime + grace` deadline and
    /// the accumulated buffer parsed; the drain resolves early once the
    /// `bestmove` line arrives (the search emits nothing further), at the
    /// deadline otherwise.
    pub async fn analyze_fen(
        &mut self,
        fen: &str,
        movetime_ms: u64,
    ) -> Result<EngineEvaluation, PipelineError> {
        match self.state {
            SessionState::Ready => {}
            _ => return Err(PipelineError::EngineNotInitialized),
        }
        self.state = SessionState::Busy;

        let mut rx = self.output.subscribe();
        let deadline = Instant::now() + Duration::from_millis(movetime_ms) + DEADLINE_GRACE;

        let position_cmd = format!("position fen {fen}");
        let go_cmd = format!("go movetime {movetime_ms}");
        self.send_commands(&["ucinewgame", position_cmd.as_str(), go_cmd.as_str()])
            .await;

        let mut lines = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Err(_) => break, // deadline elapsed
                Ok(Ok(line)) => {
                    let finished = line.starts_with("bestmove");
                    lines.push(line);
                    if finished {
                        break;
                    }
                }
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    warn!(skipped, "engine output lagged");
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => break,
            }
        }

        self.state = SessionState::Ready;
        Ok(parse_search_output(&lines))
    }

    /// Terminate the worker and release all resources.
    ///
    /// Any further operation on this session fails with
    /// [`PipelineError::EngineNotInitialized`].
    pub async fn dispose(&mut self) {
        self.send_commands(&["quit"]).await;
        if let Some(mut worker) = self.worker.take() {
            let _ = tokio::time::timeout(Duration::from_millis(500), worker.child.wait()).await;
            let _ = worker.child.start_kill();
            worker.reader.abort();
        }
        self.state = SessionState::Disposed;
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        if let Some(worker) = self.worker.as_mut() {
            let _ = worker.child.start_kill();
            worker.reader.abort();
        }
    }
}

/// Parse an accumulated search buffer into an evaluation.
///
/// Engines refine their estimate as the search deepens, so when several
/// score lines were emitted the last one wins. `cp` and `mate` overwrite
/// each other; at most one survives.
fn parse_search_output(lines: &[String]) -> EngineEvaluation {
    let mut eval = EngineEvaluation::default();
    for line in lines {
        if let Some(rest) = line.strip_prefix("bestmove") {
            // Mated/stalemated positions emit "bestmove (none)"
            eval.best_move = rest
                .split_whitespace()
                .next()
                .filter(|m| *m != "(none)")
                .map(str::to_string);
        } else if line.contains("score") {
            if let Some(cp) = parse_score(line, "cp") {
                eval.cp = Some(cp);
                eval.mate = None;
            } else if let Some(mate) = parse_score(line, "mate") {
                eval.mate = Some(mate);
                eval.cp = None;
            }
        }
    }
    eval
}

/// Extract `score <kind> <n>` from an info line.
fn parse_score(line: &str, kind: &str) -> Option<i32> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == "score" {
            if parts.next()? != kind {
                return None;
            }
            return parts.next()?.parse().ok();
        }
    }
    None
}
