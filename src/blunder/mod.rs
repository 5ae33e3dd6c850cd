//! Blunder detection.
//!
//! Classifies a candidate move by the evaluation swing it inflicts on the
//! mover and, when flagged, surfaces the better alternatives available in
//! the same position.
//!
//! Detection is advisory: when no score can be derived the verdict is
//! "not a blunder" (a false negative is preferable to a false positive),
//! while an illegal candidate move is a caller contract violation and
//! panics loudly.

use crate::eval::Evaluate;
use crate::types::{Board, Color, Move, MoveGen, Score};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Blunder detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Swing threshold in pawns; the sign is ignored and the boundary is
    /// exclusive (default -2.0)
    pub evaluation_threshold: f64,
    /// Maximum number of better alternatives reported (default 3)
    pub max_alternatives: usize,
    /// When set and an engine is available, a flagged move that is still
    /// among the engine's top-N lines is downgraded to not-a-blunder
    /// (default off)
    pub engine_top_n_exempt: Option<usize>,
    /// Budget for engine requests issued by the exemption check
    pub search_limit: crate::engine::EngineLimit,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            evaluation_threshold: -2.0,
            max_alternatives: 3,
            engine_top_n_exempt: None,
            search_limit: crate::engine::EngineLimit::default(),
        }
    }
}

/// Verdict on one candidate move.
///
/// Constructed fresh per query; a report describes the position it was
/// asked about and is stale once the game moves on.
#[derive(Debug, Clone)]
pub struct BlunderReport {
    /// The candidate move
    pub mv: Move,
    /// White-relative evaluation before the move ([`Score::none`] when not
    /// evaluable)
    pub eval_before: Score,
    /// White-relative evaluation after the move
    pub eval_after: Score,
    pub is_blunder: bool,
    /// Strictly better alternatives, mover-best first; empty unless the
    /// move was flagged
    pub alternatives: Vec<(Move, Score)>,
}

/// Classifies severe evaluation swings against the mover.
pub struct BlunderDetector {
    evaluator: Arc<dyn Evaluate>,
    config: DetectorConfig,
}

impl BlunderDetector {
    pub fn new(evaluator: Arc<dyn Evaluate>, config: DetectorConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Check a single candidate move.
    ///
    /// # Panics
    /// Panics if `mv` is not legal in `board`: the crate never invents
    /// moves, and a move from elsewhere than the rules engine's legal-move
    /// enumeration is a caller bug.
    pub fn check_blunder(&self, board: &Board, mv: Move) -> BlunderReport {
        assert!(
            board.legal(mv),
            "move {} is not legal in position {}",
            mv,
            board
        );

        let mover = board.side_to_move();
        let eval_before = self.evaluator.try_evaluate(board);
        let after = board.make_move_new(mv);
        let eval_after = self.evaluator.try_evaluate(&after);

        let mut is_blunder = classify(
            mover,
            eval_before,
            eval_after,
            self.config.evaluation_threshold,
        );

        if is_blunder && self.engine_exempts(board, mv) {
            is_blunder = false;
        }

        let alternatives = if is_blunder {
            // eval_after is Some here, otherwise classify returned false
            self.find_better_moves(board, mv, eval_after.unwrap_or_else(Score::none))
        } else {
            Vec::new()
        };

        BlunderReport {
            mv,
            eval_before: eval_before.unwrap_or_else(Score::none),
            eval_after: eval_after.unwrap_or_else(Score::none),
            is_blunder,
            alternatives,
        }
    }

    /// Check every legal move in the position and collect the flagged ones.
    ///
    /// Worst case O(moves²): each flagged move's alternative search
    /// re-evaluates all other moves. Callers facing huge branching factors
    /// should cap the position set rather than this call.
    pub fn analyze_position(&self, board: &Board) -> Vec<BlunderReport> {
        MoveGen::new_legal(board)
            .map(|mv| self.check_blunder(board, mv))
            .filter(|report| report.is_blunder)
            .collect()
    }

    /// Alternatives strictly better than `eval_after` from the mover's
    /// perspective, best first, capped at `max_alternatives`.
    fn find_better_moves(
        &self,
        board: &Board,
        candidate: Move,
        eval_after: Score,
    ) -> Vec<(Move, Score)> {
        let mover = board.side_to_move();
        let mut better: Vec<(Move, Score)> = Vec::new();

        for mv in MoveGen::new_legal(board) {
            if mv == candidate {
                continue;
            }
            let Some(eval) = self.evaluator.try_evaluate(&board.make_move_new(mv)) else {
                continue;
            };
            let improves = match mover {
                Color::White => eval > eval_after,
                Color::Black => eval < eval_after,
            };
            if improves {
                better.push((mv, eval));
            }
        }

        better.sort_by(|a, b| match mover {
            Color::White => b.1.total_cmp(&a.1),
            Color::Black => a.1.total_cmp(&b.1),
        });
        better.truncate(self.config.max_alternatives);
        better
    }

    /// Engine top-N exemption: a flagged move the engine itself ranks
    /// among its top lines is trusted over the swing heuristic. Engine
    /// failures leave the original verdict standing.
    fn engine_exempts(&self, board: &Board, mv: Move) -> bool {
        let (Some(n), Some(engine)) = (self.config.engine_top_n_exempt, self.evaluator.engine())
        else {
            return false;
        };
        if n == 0 {
            return false;
        }
        match engine.analyze(board, &self.config.search_limit, n as u32) {
            Ok(analysis) => analysis.lines.iter().take(n).any(|line| line.mv == mv),
            Err(e) => {
                eprintln!("warning: engine top-N check failed ({}); keeping verdict", e);
                false
            }
        }
    }
}

/// Blunder predicate. Exclusive boundary: a swing of exactly the threshold
/// is not a blunder. Missing evaluations fail safe to `false`.
fn classify(
    mover: Color,
    eval_before: Option<Score>,
    eval_after: Option<Score>,
    threshold: f64,
) -> bool {
    let (Some(before), Some(after)) = (eval_before, eval_after) else {
        return false;
    };
    let swing = match mover {
        // White blunders when the evaluation drops...
        Color::White => before.raw() - after.raw(),
        // ...Black when it rises
        Color::Black => after.raw() - before.raw(),
    };
    swing > threshold.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{hce, Evaluator};
    use crate::types::Square;
    use std::str::FromStr;

    /// Evaluator fake with fixed per-FEN scores; unknown positions fall
    /// back to the heuristic. Lets tests create controlled swings.
    struct ScriptedEval {
        scores: Vec<(String, Option<Score>)>,
    }

    impl ScriptedEval {
        fn new(scores: &[(&str, Option<f64>)]) -> Self {
            Self {
                scores: scores
                    .iter()
                    .map(|(fen, s)| (fen.to_string(), s.map(Score::pawns)))
                    .collect(),
            }
        }
    }

    impl Evaluate for ScriptedEval {
        fn evaluate(&self, board: &Board) -> Score {
            self.try_evaluate(board).unwrap_or_else(Score::draw)
        }

        fn try_evaluate(&self, board: &Board) -> Option<Score> {
            let fen = board.to_string();
            match self.scores.iter().find(|(f, _)| *f == fen) {
                Some((_, score)) => *score,
                None => Some(hce::evaluate(board)),
            }
        }
    }

    fn detector(config: DetectorConfig) -> BlunderDetector {
        BlunderDetector::new(Arc::new(Evaluator::heuristic()), config)
    }

    #[test]
    fn test_classify_boundary_is_exclusive() {
        let before = Some(Score::pawns(1.0));
        // Swing of exactly 2.0 pawns: not a blunder
        assert!(!classify(
            Color::White,
            before,
            Some(Score::pawns(-1.0)),
            -2.0
        ));
        // Slightly past the threshold: blunder
        assert!(classify(
            Color::White,
            before,
            Some(Score::pawns(-1.001)),
            -2.0
        ));
        // Black blunders in the other direction
        assert!(classify(
            Color::Black,
            before,
            Some(Score::pawns(3.001)),
            -2.0
        ));
        assert!(!classify(
            Color::Black,
            before,
            Some(Score::pawns(-5.0)),
            -2.0
        ));
    }

    #[test]
    fn test_classify_fails_safe_without_scores() {
        assert!(!classify(Color::White, None, Some(Score::pawns(-9.0)), -2.0));
        assert!(!classify(Color::White, Some(Score::pawns(9.0)), None, -2.0));
        assert!(!classify(Color::White, None, None, -2.0));
    }

    #[test]
    fn test_not_evaluable_position_is_never_a_blunder() {
        let board = Board::default();
        let after = board.make_move_new(Move::new(Square::E2, Square::E4, None));
        let scripted = ScriptedEval::new(&[
            (&board.to_string(), None),
            (&after.to_string(), Some(-50.0)),
        ]);
        let detector = BlunderDetector::new(Arc::new(scripted), DetectorConfig::default());
        let report = detector.check_blunder(&board, Move::new(Square::E2, Square::E4, None));
        assert!(!report.is_blunder);
        assert!(report.eval_before.is_none());
        assert!(report.alternatives.is_empty());
    }

    #[test]
    fn test_hanging_queen_swing_is_flagged_with_alternatives() {
        // Scripted swing: the position is equal, but after Qh5 the queen is
        // lost for nothing and the evaluation collapses for White
        let board =
            Board::from_str("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let blunder = Move::new(Square::D1, Square::H5, None);
        let after = board.make_move_new(blunder);
        let scripted = ScriptedEval::new(&[
            (&board.to_string(), Some(0.2)),
            (&after.to_string(), Some(-8.8)),
        ]);
        let detector = BlunderDetector::new(Arc::new(scripted), DetectorConfig::default());

        let report = detector.check_blunder(&board, blunder);
        assert!(report.is_blunder);
        assert_eq!(report.eval_before.raw(), 0.2);
        assert_eq!(report.eval_after.raw(), -8.8);
        assert!(!report.alternatives.is_empty());
        // Alternatives are mover-best first and all beat the blunder
        for pair in report.alternatives.windows(2) {
            assert!(pair[0].1.raw() >= pair[1].1.raw());
        }
        for (_, eval) in &report.alternatives {
            assert!(eval.raw() > -8.8);
        }
        assert!(report.alternatives.len() <= 3);
    }

    #[test]
    fn test_throwing_away_a_won_position_heuristically() {
        // White is a queen up; cornering the enemy king into stalemate
        // drops the evaluation from winning to 0.0
        let board = Board::from_str("k7/6Q1/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let stalemating = Move::new(Square::G7, Square::C7, None);
        let report = detector(DetectorConfig::default()).check_blunder(&board, stalemating);
        assert!(report.is_blunder);
        assert_eq!(report.eval_after.raw(), 0.0);
        assert!(!report.alternatives.is_empty());
    }

    #[test]
    fn test_quiet_move_is_not_a_blunder() {
        let board = Board::default();
        let report = detector(DetectorConfig::default())
            .check_blunder(&board, Move::new(Square::E2, Square::E4, None));
        assert!(!report.is_blunder);
        assert!(report.alternatives.is_empty());
    }

    #[test]
    fn test_starting_position_has_no_blunders() {
        let reports = detector(DetectorConfig::default()).analyze_position(&Board::default());
        assert!(reports.is_empty());
    }

    #[test]
    fn test_analyze_position_collects_flagged_moves() {
        // The stalemating queen move must be among the flagged reports
        let board = Board::from_str("k7/6Q1/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let reports = detector(DetectorConfig::default()).analyze_position(&board);
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|r| r.is_blunder));
        assert!(reports
            .iter()
            .any(|r| r.mv == Move::new(Square::G7, Square::C7, None)));
    }

    #[test]
    #[should_panic(expected = "not legal")]
    fn test_illegal_move_panics() {
        let board = Board::default();
        let _ = detector(DetectorConfig::default())
            .check_blunder(&board, Move::new(Square::E2, Square::E5, None));
    }

    #[test]
    fn test_check_blunder_does_not_mutate_the_board() {
        let board = Board::default();
        let fen = board.to_string();
        let _ = detector(DetectorConfig::default())
            .check_blunder(&board, Move::new(Square::G1, Square::F3, None));
        assert_eq!(board.to_string(), fen);
    }
}
