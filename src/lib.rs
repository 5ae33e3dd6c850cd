//! Chess position evaluation and move advisory.
//!
//! Built on the `chess` crate for rules and move generation. Three
//! cooperating components share one evaluation seam:
//! - [`eval::Evaluator`] scores positions, white-relative, preferring a
//!   configured external UCI engine and falling back to a material,
//!   piece-square and mobility heuristic
//! - [`advisor::MoveAdvisor`] ranks the legal moves of a position with an
//!   optional seeded shake-up for variety
//! - [`blunder::BlunderDetector`] flags moves that swing the evaluation
//!   severely against the mover and proposes better alternatives
//!
//! Wire everything together from a JSON file via [`config::AnalysisConfig`]:
//!
//! ```no_run
//! use chess_advisor::{AnalysisConfig, Board};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let (advisor, detector) = AnalysisConfig::load_or_default().build();
//! let board = Board::default();
//! let mut rng = StdRng::seed_from_u64(42);
//! for suggestion in advisor.suggest_moves(&board, &mut rng) {
//!     println!("{} {}", suggestion.mv, suggestion.evaluation);
//! }
//! for report in detector.analyze_position(&board) {
//!     println!("{} would be a blunder", report.mv);
//! }
//! ```

pub mod advisor;
pub mod blunder;
pub mod config;
pub mod engine;
pub mod eval;
pub mod types;

pub use advisor::{AdvisorConfig, MoveAdvisor, MoveSuggestion, Rationale};
pub use blunder::{BlunderDetector, BlunderReport, DetectorConfig};
pub use config::AnalysisConfig;
pub use engine::{EngineAnalysis, EngineLimit, EngineLine, UciEngine};
pub use eval::{EvalSource, Evaluate, Evaluator, PositionSummary};
pub use types::{Board, Color, Move, Piece, Score, Square};
