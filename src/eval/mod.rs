//! Position evaluation.
//!
//! Uses the external engine if configured, otherwise the heuristic
//! evaluation in [`hce`]. Engine failures (absent binary, crash, timeout,
//! missing score) are always recoverable: they are logged once and the
//! heuristic answer is returned instead, so evaluation never fails past
//! this boundary.

pub mod hce;
pub mod pst;

pub use hce::is_insufficient_material;
pub use pst::{game_phase, Phase};

use crate::engine::{EngineLimit, UciEngine};
use crate::types::{Board, BoardStatus, Score, EMPTY};
use std::sync::Arc;

/// Where a score came from. Callers may weigh engine lines and heuristic
/// guesses with different confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalSource {
    /// Reported by the external search engine
    Engine,
    /// Computed by the built-in heuristic
    Heuristic,
}

/// Evaluation seam for the advisory components.
///
/// The production implementation is [`Evaluator`]; tests substitute
/// table-driven fakes to create controlled evaluation swings.
pub trait Evaluate: Send + Sync {
    /// White-relative score for the position. Must not mutate the board
    /// and must always return a finite score.
    fn evaluate(&self, board: &Board) -> Score;

    /// Evaluation that may decline to answer. The default never does;
    /// blunder detection treats `None` as "not evaluable" and fails safe.
    fn try_evaluate(&self, board: &Board) -> Option<Score> {
        Some(self.evaluate(board))
    }

    /// External engine handle, when one is configured and healthy.
    fn engine(&self) -> Option<&UciEngine> {
        None
    }

    /// Budget for engine requests issued on behalf of this evaluator.
    fn engine_limit(&self) -> EngineLimit {
        EngineLimit::default()
    }
}

/// Standard evaluator: engine-first with guaranteed heuristic fallback.
#[derive(Clone)]
pub struct Evaluator {
    engine: Option<Arc<UciEngine>>,
    limit: EngineLimit,
}

impl Evaluator {
    /// Heuristic-only evaluator.
    pub fn heuristic() -> Self {
        Self {
            engine: None,
            limit: EngineLimit::default(),
        }
    }

    /// Evaluator that prefers the given engine under the given budget.
    pub fn with_engine(engine: Arc<UciEngine>, limit: EngineLimit) -> Self {
        Self {
            engine: Some(engine),
            limit,
        }
    }

    /// Evaluate and report where the score came from.
    pub fn evaluate_with_source(&self, board: &Board) -> (Score, EvalSource) {
        if let Some(engine) = &self.engine {
            match engine.analyze(board, &self.limit, 1) {
                Ok(analysis) => {
                    if let Some(score) = analysis.score() {
                        return (score, EvalSource::Engine);
                    }
                    eprintln!("warning: engine reply carried no score; using heuristic");
                }
                Err(e) => {
                    eprintln!("warning: engine evaluation failed ({}); using heuristic", e);
                }
            }
        }
        (hce::evaluate(board), EvalSource::Heuristic)
    }

    /// Summarize a position: evaluation plus the state flags a caller
    /// typically displays alongside it.
    pub fn summarize(&self, board: &Board) -> PositionSummary {
        let (evaluation, source) = self.evaluate_with_source(board);
        PositionSummary {
            evaluation,
            source,
            in_check: *board.checkers() != EMPTY,
            checkmate: board.status() == BoardStatus::Checkmate,
            stalemate: board.status() == BoardStatus::Stalemate,
            insufficient_material: is_insufficient_material(board),
            legal_moves: crate::types::MoveGen::new_legal(board).len(),
        }
    }
}

impl Evaluate for Evaluator {
    fn evaluate(&self, board: &Board) -> Score {
        self.evaluate_with_source(board).0
    }

    fn engine(&self) -> Option<&UciEngine> {
        self.engine.as_deref()
    }

    fn engine_limit(&self) -> EngineLimit {
        self.limit.clone()
    }
}

/// Snapshot of a position's evaluation and game-state flags.
#[derive(Debug, Clone)]
pub struct PositionSummary {
    /// White-relative evaluation
    pub evaluation: Score,
    /// Provenance of the evaluation
    pub source: EvalSource,
    /// Side to move is in check
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub insufficient_material: bool,
    /// Number of legal moves for the side to move
    pub legal_moves: usize,
}
