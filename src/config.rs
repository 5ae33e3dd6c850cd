//! Top-level analysis configuration.
//!
//! All knobs in one serializable struct, loadable from a JSON file next to
//! the binary, with documented defaults. `build` wires the configured
//! components together; an engine that fails to start degrades the session
//! to heuristic-only analysis instead of failing it.

use crate::advisor::{AdvisorConfig, MoveAdvisor};
use crate::blunder::{BlunderDetector, DetectorConfig};
use crate::engine::{EngineLimit, UciEngine};
use crate::eval::{Evaluate, Evaluator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default config file name.
const CONFIG_PATH: &str = "advisor_config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    /// Path to a UCI engine binary (e.g. Stockfish). `None` runs
    /// heuristic-only.
    pub engine_path: Option<String>,
    /// Budget for evaluation requests to the engine
    pub search_limit: EngineLimit,
    pub advisor: AdvisorConfig,
    pub detector: DetectorConfig,
}

impl AnalysisConfig {
    /// Load from `advisor_config.json` in the working directory.
    pub fn load() -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(CONFIG_PATH)?;
        let config: AnalysisConfig = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Load, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Build the advisor and detector, sharing one evaluator.
    ///
    /// A configured engine that cannot be spawned is logged and dropped;
    /// analysis proceeds on heuristics alone.
    pub fn build(&self) -> (MoveAdvisor, BlunderDetector) {
        let evaluator = match &self.engine_path {
            Some(path) => match UciEngine::spawn(path) {
                Ok(engine) => {
                    Evaluator::with_engine(Arc::new(engine), self.search_limit.clone())
                }
                Err(e) => {
                    eprintln!(
                        "warning: could not start engine at {} ({}); using heuristic evaluation",
                        path, e
                    );
                    Evaluator::heuristic()
                }
            },
            None => Evaluator::heuristic(),
        };
        let evaluator: Arc<dyn Evaluate> = Arc::new(evaluator);

        (
            MoveAdvisor::new(evaluator.clone(), self.advisor.clone()),
            BlunderDetector::new(evaluator, self.detector.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_knobs() {
        let config = AnalysisConfig::default();
        assert!(config.engine_path.is_none());
        assert_eq!(config.advisor.max_suggestions, 5);
        assert_eq!(config.advisor.randomness, 0.0);
        assert_eq!(config.detector.evaluation_threshold, -2.0);
        assert_eq!(config.detector.max_alternatives, 3);
        assert_eq!(config.search_limit.depth, Some(15));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = AnalysisConfig {
            engine_path: Some("/usr/games/stockfish".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.engine_path.as_deref(), Some("/usr/games/stockfish"));
        assert_eq!(restored.detector.evaluation_threshold, -2.0);
    }

    #[test]
    fn test_build_without_engine_is_heuristic_only() {
        let (advisor, detector) = AnalysisConfig::default().build();
        assert_eq!(advisor.config().max_suggestions, 5);
        assert_eq!(detector.config().max_alternatives, 3);
    }

    #[test]
    fn test_build_survives_a_missing_engine_binary() {
        let config = AnalysisConfig {
            engine_path: Some("/nonexistent/engine".to_string()),
            ..Default::default()
        };
        // Must not fail; degrades to heuristics
        let (_, detector) = config.build();
        let report = detector.check_blunder(
            &crate::types::Board::default(),
            crate::engine::parse_move(&crate::types::Board::default(), "e2e4").unwrap(),
        );
        assert!(!report.is_blunder);
    }
}
