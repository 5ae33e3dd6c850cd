//! One-ply move ranking.
//!
//! For every legal move the advisor evaluates the resulting position and
//! ranks the moves from the mover's perspective. When an external engine is
//! available its multi-PV lines are used instead; the heuristic path is a
//! depth-1 greedy search and never recurses into replies.
//!
//! # Sign contract
//! `MoveSuggestion::evaluation` is always white-relative, matching the
//! crate-wide [`Score`] convention. Only the *ranking key* is
//! mover-relative: suggestions are ordered by `evaluation` descending when
//! White moves and ascending when Black moves.

use crate::eval::{hce, Evaluate};
use crate::types::{Board, BoardStatus, Color, Move, MoveGen, Score};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a suggestion was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rationale {
    /// Taken from an engine multi-PV line
    EngineLine,
    /// Ranked by the one-ply heuristic search
    Heuristic,
}

/// A ranked candidate move.
#[derive(Debug, Clone)]
pub struct MoveSuggestion {
    pub mv: Move,
    /// White-relative evaluation of the move
    pub evaluation: Score,
    pub rationale: Rationale,
}

/// Move advisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Maximum number of suggestions returned (default 5)
    pub max_suggestions: usize,
    /// Rank perturbation in [0, 1]: 0 is deterministic best-first, 1
    /// approaches a uniform shuffle. Out-of-range values are clamped,
    /// never rejected (default 0)
    pub randomness: f64,
    /// Budget for engine-backed suggestion requests
    pub search_limit: crate::engine::EngineLimit,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            randomness: 0.0,
            search_limit: crate::engine::EngineLimit::default(),
        }
    }
}

/// Ranks legal moves by estimated quality.
///
/// Stateless between calls: recomputation with the same position, config
/// and RNG state is idempotent.
pub struct MoveAdvisor {
    evaluator: Arc<dyn Evaluate>,
    config: AdvisorConfig,
}

impl MoveAdvisor {
    pub fn new(evaluator: Arc<dyn Evaluate>, config: AdvisorConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Suggest up to `max_suggestions` moves, best first.
    ///
    /// Game-over positions yield an empty list. The RNG is supplied by the
    /// caller so runs are reproducible under a fixed seed.
    pub fn suggest_moves<R: Rng>(&self, board: &Board, rng: &mut R) -> Vec<MoveSuggestion> {
        if board.status() != BoardStatus::Ongoing {
            return Vec::new();
        }

        let mut suggestions = match self.engine_suggestions(board) {
            Some(lines) if !lines.is_empty() => lines,
            _ => self.heuristic_suggestions(board),
        };

        perturb(&mut suggestions, self.config.randomness, rng);
        suggestions.truncate(self.config.max_suggestions);
        suggestions
    }

    /// Multi-PV lines from the engine, already white-relative and
    /// deduplicated by first move. `None` drops to the heuristic path.
    fn engine_suggestions(&self, board: &Board) -> Option<Vec<MoveSuggestion>> {
        let engine = self.evaluator.engine()?;
        let multipv = self.config.max_suggestions.max(1) as u32;
        match engine.analyze(board, &self.config.search_limit, multipv) {
            Ok(analysis) => {
                let mut out = Vec::with_capacity(analysis.lines.len());
                for line in analysis.lines {
                    let Some(evaluation) = line.score else {
                        continue;
                    };
                    out.push(MoveSuggestion {
                        mv: line.mv,
                        evaluation,
                        rationale: Rationale::EngineLine,
                    });
                }
                Some(out)
            }
            Err(e) => {
                eprintln!(
                    "warning: engine move suggestion failed ({}); using heuristic ranking",
                    e
                );
                None
            }
        }
    }

    /// Depth-1 greedy ranking of every legal move.
    fn heuristic_suggestions(&self, board: &Board) -> Vec<MoveSuggestion> {
        let mover = board.side_to_move();
        let mut suggestions: Vec<MoveSuggestion> = MoveGen::new_legal(board)
            .map(|mv| {
                let evaluation = hce::evaluate(&board.make_move_new(mv));
                MoveSuggestion {
                    mv,
                    evaluation,
                    rationale: Rationale::Heuristic,
                }
            })
            .collect();

        // Best for the mover first
        suggestions.sort_by(|a, b| {
            let (ka, kb) = match mover {
                Color::White => (a.evaluation, b.evaluation),
                Color::Black => (-a.evaluation, -b.evaluation),
            };
            kb.total_cmp(&ka)
        });
        suggestions
    }
}

/// Biased adjacent-swap shuffle: walking from the tail, each element swaps
/// with a uniformly chosen earlier slot with probability `randomness`.
/// Perturbs the ranking without fully destroying the signal.
fn perturb<R: Rng>(suggestions: &mut [MoveSuggestion], randomness: f64, rng: &mut R) {
    let randomness = randomness.clamp(0.0, 1.0);
    if randomness <= 0.0 || suggestions.len() < 2 {
        return;
    }
    for i in (1..suggestions.len()).rev() {
        if rng.gen::<f64>() < randomness {
            let j = rng.gen_range(0..=i);
            suggestions.swap(i, j);
        }
    }
}
