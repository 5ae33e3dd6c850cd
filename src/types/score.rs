//! Score type for position evaluation.
//!
//! Scores are white-relative pawn units: positive favors White, negative
//! favors Black, regardless of whose turn it is. Forced mates are encoded
//! with a large sentinel magnitude so they dominate any material swing.

use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Mate sentinel in pawn units. Mate in N plies is `SCORE_MATE - N`,
/// mated in N plies is `-SCORE_MATE + N`.
pub const SCORE_MATE: f64 = 10000.0;
/// Draw score.
pub const SCORE_DRAW: f64 = 0.0;
/// "No score derivable" sentinel, outside the representable range.
pub const SCORE_NONE: f64 = -32001.0;

// Mate score bounds for detection. Ordinary evaluation stays within
// roughly [-100, 100] pawns, so the band is generous.
const SCORE_MATE_IN_MAX: f64 = SCORE_MATE - 1000.0;
const SCORE_MATED_IN_MAX: f64 = -SCORE_MATE + 1000.0;

/// A white-relative evaluation in pawn units.
///
/// Finite by construction; evaluation code only ever sums finite constants,
/// and engine replies are converted from integer centipawns.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Score(pub f64);

impl Score {
    /// Create a score from pawn units
    #[inline]
    pub fn pawns(pawns: f64) -> Self {
        debug_assert!(pawns.is_finite());
        Score(pawns)
    }

    /// Create a score from integer centipawns
    #[inline]
    pub fn cp(centipawns: i32) -> Self {
        Score(centipawns as f64 / 100.0)
    }

    /// Mate in N plies for White
    #[inline]
    pub fn mate_in(ply: u32) -> Self {
        Score(SCORE_MATE - ply as f64)
    }

    /// Mated in N plies for White
    #[inline]
    pub fn mated_in(ply: u32) -> Self {
        Score(-SCORE_MATE + ply as f64)
    }

    /// Draw score
    #[inline]
    pub const fn draw() -> Self {
        Score(SCORE_DRAW)
    }

    /// No score / undefined
    #[inline]
    pub const fn none() -> Self {
        Score(SCORE_NONE)
    }

    /// Get the raw value in pawn units
    #[inline]
    pub const fn raw(self) -> f64 {
        self.0
    }

    /// Check if this is the "no score" sentinel
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == SCORE_NONE
    }

    /// Check if this is a mate score (White winning)
    #[inline]
    pub fn is_mate(self) -> bool {
        self.0 >= SCORE_MATE_IN_MAX
    }

    /// Check if this is a mated score (White losing)
    #[inline]
    pub fn is_mated(self) -> bool {
        !self.is_none() && self.0 <= SCORE_MATED_IN_MAX
    }

    /// Check if this is any kind of mate score
    #[inline]
    pub fn is_mate_score(self) -> bool {
        self.is_mate() || self.is_mated()
    }

    /// Total ordering for sorting (no NaN by construction)
    #[inline]
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Score {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Score(self.0 + rhs.0)
    }
}

impl Sub for Score {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Score(self.0 - rhs.0)
    }
}

impl Neg for Score {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Score(-self.0)
    }
}

impl From<f64> for Score {
    #[inline]
    fn from(v: f64) -> Self {
        Score::pawns(v)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else if self.is_mate() {
            write!(f, "mate {}", (SCORE_MATE - self.0) as i32)
        } else if self.is_mated() {
            write!(f, "mate -{}", (self.0 + SCORE_MATE) as i32)
        } else {
            write!(f, "{:+.2}", self.0)
        }
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores() {
        let mate_in_3 = Score::mate_in(3);
        assert!(mate_in_3.is_mate());
        assert!(!mate_in_3.is_mated());
        assert!(mate_in_3 > Score::pawns(99.0));

        let mated_in_2 = Score::mated_in(2);
        assert!(!mated_in_2.is_mate());
        assert!(mated_in_2.is_mated());
        assert!(mated_in_2 < Score::pawns(-99.0));
    }

    #[test]
    fn test_none_is_not_a_mate() {
        let none = Score::none();
        assert!(none.is_none());
        assert!(!none.is_mated());
        assert!(!none.is_mate_score());
    }

    #[test]
    fn test_cp_conversion() {
        assert_eq!(Score::cp(150).raw(), 1.5);
        assert_eq!(Score::cp(-25).raw(), -0.25);
    }

    #[test]
    fn test_display() {
        assert_eq!(Score::pawns(1.5).to_string(), "+1.50");
        assert_eq!(Score::mate_in(4).to_string(), "mate 4");
        assert_eq!(Score::mated_in(1).to_string(), "mate -1");
    }
}
