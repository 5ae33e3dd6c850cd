//! External UCI engine adapter.
//!
//! Wraps a long-lived UCI subprocess (e.g. Stockfish) behind a synchronous
//! request/response interface:
//! - One analysis request in flight at a time (the engine's internal state
//!   is single-threaded), enforced with a mutex
//! - Every request runs under a bounded wall-clock budget; a missing or
//!   partial reply is a timeout error, never an indefinite block
//! - A timed-out request is abandoned (`stop` is sent, the read gives up);
//!   the subprocess itself stays alive and reusable
//! - The process is acquired in `spawn` and reaped on `Drop`, including on
//!   error paths
//!
//! All failures surface as `anyhow` errors; callers (the evaluator) treat
//! them as recoverable and fall back to heuristics.

mod parser;

pub use parser::{format_move, parse_bestmove, parse_move};

use crate::types::{Board, Color, Move, Score};
use anyhow::{anyhow, bail, Context, Result};
use parser::RawScore;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Default search depth when no limit is configured.
const DEFAULT_DEPTH: u32 = 15;
/// Hard wall-clock cap for depth-limited requests.
const DEPTH_BUDGET: Duration = Duration::from_secs(10);
/// Extra wall-clock grace on top of a movetime request.
const MOVETIME_GRACE: Duration = Duration::from_secs(1);
/// Budget for the initial uci/isready handshake.
const HANDSHAKE_BUDGET: Duration = Duration::from_secs(5);
/// How long to wait for the process to exit after `quit`.
const QUIT_GRACE: Duration = Duration::from_millis(200);

/// Time or depth budget for one analysis request.
///
/// When both are set, movetime wins (it gives the tighter bound).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineLimit {
    /// Maximum search depth
    pub depth: Option<u32>,
    /// Maximum search time in milliseconds
    pub movetime_ms: Option<u64>,
}

impl Default for EngineLimit {
    fn default() -> Self {
        Self {
            depth: Some(DEFAULT_DEPTH),
            movetime_ms: None,
        }
    }
}

impl EngineLimit {
    /// Fixed-depth limit
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            movetime_ms: None,
        }
    }

    /// Fixed-time limit
    pub fn movetime(ms: u64) -> Self {
        Self {
            depth: None,
            movetime_ms: Some(ms),
        }
    }

    /// The `go` command for this limit
    fn go_command(&self) -> String {
        if let Some(ms) = self.movetime_ms {
            format!("go movetime {}", ms)
        } else {
            format!("go depth {}", self.depth.unwrap_or(DEFAULT_DEPTH))
        }
    }

    /// Wall-clock budget after which the request counts as timed out
    fn budget(&self) -> Duration {
        match self.movetime_ms {
            Some(ms) => Duration::from_millis(ms) + MOVETIME_GRACE,
            None => DEPTH_BUDGET,
        }
    }
}

/// One engine line: a candidate first move with its score and continuation.
#[derive(Debug, Clone)]
pub struct EngineLine {
    /// First move of the line, legal in the analyzed position
    pub mv: Move,
    /// White-relative score, if the engine reported one
    pub score: Option<Score>,
    /// Full principal variation
    pub pv: Vec<Move>,
}

/// Result of one analysis request.
#[derive(Debug, Clone, Default)]
pub struct EngineAnalysis {
    /// Lines in multi-PV order (best first)
    pub lines: Vec<EngineLine>,
}

impl EngineAnalysis {
    /// White-relative score of the best line, if any
    pub fn score(&self) -> Option<Score> {
        self.lines.first().and_then(|l| l.score)
    }

    /// Best move, if any
    pub fn best_move(&self) -> Option<Move> {
        self.lines.first().map(|l| l.mv)
    }
}

struct EngineIo {
    child: Child,
    stdin: ChildStdin,
    rx: Receiver<String>,
    /// MultiPV value currently configured on the engine
    multipv: u32,
}

impl EngineIo {
    fn send(&mut self, command: &str) -> Result<()> {
        writeln!(self.stdin, "{}", command).context("failed to write to engine stdin")?;
        self.stdin.flush().context("failed to flush engine stdin")?;
        Ok(())
    }

    /// Discard output left over from an abandoned request.
    fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }

    /// Read lines until `accept` matches one, within the budget.
    fn wait_for(&mut self, accept: impl Fn(&str) -> bool, budget: Duration) -> Result<String> {
        let deadline = Instant::now() + budget;
        loop {
            let now = Instant::now();
            if now >= deadline {
                bail!("engine did not respond within {:?}", budget);
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(line) if accept(&line) => return Ok(line),
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {
                    bail!("engine did not respond within {:?}", budget)
                }
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("engine process closed its output")
                }
            }
        }
    }
}

/// A running UCI engine subprocess.
pub struct UciEngine {
    io: Mutex<EngineIo>,
    path: PathBuf,
}

impl UciEngine {
    /// Spawn the engine binary at `path` and complete the UCI handshake.
    pub fn spawn(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start engine at {}", path.display()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("engine stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("engine stdout unavailable"))?;

        // Reader thread: forward engine output line by line until EOF
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        let mut io = EngineIo {
            child,
            stdin,
            rx,
            multipv: 1,
        };

        io.send("uci")?;
        io.wait_for(|l| l.trim() == "uciok", HANDSHAKE_BUDGET)
            .context("engine did not complete UCI handshake")?;
        io.send("isready")?;
        io.wait_for(|l| l.trim() == "readyok", HANDSHAKE_BUDGET)?;

        Ok(Self {
            io: Mutex::new(io),
            path,
        })
    }

    /// Path the engine was spawned from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Analyze a position, returning up to `multipv` ranked lines.
    ///
    /// Scores are converted from the engine's side-to-move-relative
    /// convention to white-relative before they leave the adapter.
    pub fn analyze(
        &self,
        board: &Board,
        limit: &EngineLimit,
        multipv: u32,
    ) -> Result<EngineAnalysis> {
        let multipv = multipv.max(1);
        let mut io = self.io.lock().map_err(|_| anyhow!("engine mutex poisoned"))?;

        io.drain();
        if io.multipv != multipv {
            io.send(&format!("setoption name MultiPV value {}", multipv))?;
            io.multipv = multipv;
        }
        // Board displays as FEN
        io.send(&format!("position fen {}", board))?;
        io.send(&limit.go_command())?;

        // Collect the deepest info line per multipv rank until bestmove
        let mut infos: Vec<Option<parser::InfoLine>> = vec![None; multipv as usize];
        let budget = limit.budget();
        let deadline = Instant::now() + budget;
        loop {
            let now = Instant::now();
            if now >= deadline {
                // Abandon the request; the process stays reusable
                let _ = io.send("stop");
                bail!("engine analysis timed out after {:?}", budget);
            }
            match io.rx.recv_timeout(deadline - now) {
                Ok(line) => {
                    if let Some(info) = parser::parse_info(&line) {
                        let rank = info.multipv as usize;
                        if (1..=infos.len()).contains(&rank) {
                            infos[rank - 1] = Some(info);
                        }
                    } else if line.starts_with("bestmove") {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let _ = io.send("stop");
                    bail!("engine analysis timed out after {:?}", budget);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("engine process closed its output");
                }
            }
        }
        drop(io);

        let stm = board.side_to_move();
        let mut lines = Vec::new();
        for info in infos.into_iter().flatten() {
            let Some(first) = info.pv.first() else {
                continue;
            };
            let Some(mv) = parser::parse_move(board, first) else {
                continue;
            };
            // Duplicate first moves can appear when MultiPV was raised
            // mid-session; keep the better-ranked line
            if lines.iter().any(|l: &EngineLine| l.mv == mv) {
                continue;
            }
            lines.push(EngineLine {
                mv,
                score: info.score.map(|s| to_white_relative(s, stm)),
                pv: walk_pv(board, &info.pv),
            });
        }

        Ok(EngineAnalysis { lines })
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        if let Ok(mut io) = self.io.lock() {
            let _ = io.send("quit");
            let deadline = Instant::now() + QUIT_GRACE;
            while Instant::now() < deadline {
                if matches!(io.child.try_wait(), Ok(Some(_))) {
                    return;
                }
                thread::sleep(Duration::from_millis(10));
            }
            let _ = io.child.kill();
            let _ = io.child.wait();
        }
    }
}

/// Convert a side-to-move-relative engine score to white-relative.
fn to_white_relative(raw: RawScore, side_to_move: Color) -> Score {
    let score = match raw {
        RawScore::Cp(cp) => Score::cp(cp),
        RawScore::Mate(n) if n >= 0 => Score::mate_in(n.unsigned_abs()),
        RawScore::Mate(n) => Score::mated_in(n.unsigned_abs()),
    };
    match side_to_move {
        Color::White => score,
        Color::Black => -score,
    }
}

/// Replay a PV's move strings against the position, stopping at the first
/// move that does not parse as legal.
fn walk_pv(board: &Board, pv: &[String]) -> Vec<Move> {
    let mut moves = Vec::with_capacity(pv.len());
    let mut current = *board;
    for token in pv {
        match parser::parse_move(&current, token) {
            Some(m) => {
                current = current.make_move_new(m);
                moves.push(m);
            }
            None => break,
        }
    }
    moves
}
