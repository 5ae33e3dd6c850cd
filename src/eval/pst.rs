//! Piece-square tables and game-phase detection.
//!
//! One 64-entry table per piece type, in centipawns, written rank 8 first
//! (visual board order). White squares are flipped with `idx ^ 56` so the
//! same tables serve both colors by symmetry. The king has separate
//! middlegame and endgame tables; the phase cut is a hard piece-count
//! threshold, not an interpolation.

use crate::types::{Board, Color, Piece, Square, Value};

/// Game phase, derived from total piece count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Middlegame,
    Endgame,
}

/// Positions with this many pieces or fewer count as endgame.
pub const ENDGAME_PIECE_THRESHOLD: u32 = 12;

/// Determine the game phase for a position.
#[inline]
pub fn game_phase(board: &Board) -> Phase {
    if board.combined().popcnt() <= ENDGAME_PIECE_THRESHOLD {
        Phase::Endgame
    } else {
        Phase::Middlegame
    }
}

// ============================================================================
// PIECE-SQUARE TABLES (rank 8 first, a8 = index 0)
// ============================================================================

// Pawns: encourage center control and advancement
#[rustfmt::skip]
const PAWN_PST: [Value; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

// Knights: encourage centralization
#[rustfmt::skip]
const KNIGHT_PST: [Value; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

// Bishops: long diagonals, avoid the rim
#[rustfmt::skip]
const BISHOP_PST: [Value; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

// Rooks: seventh rank and central files
#[rustfmt::skip]
const ROOK_PST: [Value; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

// Queens: mild centralization
#[rustfmt::skip]
const QUEEN_PST: [Value; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

// King, middlegame: stay castled, shun the center
#[rustfmt::skip]
const KING_PST_MG: [Value; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

// King, endgame: centralize and activate
#[rustfmt::skip]
const KING_PST_EG: [Value; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

/// Get PST index for a square as seen from the given color's side
#[inline]
fn pst_index(sq: Square, color: Color) -> usize {
    let idx = sq.to_index();
    if color == Color::White {
        // Flip for white (rank 1 -> rank 8)
        idx ^ 56
    } else {
        idx
    }
}

/// Positional bonus in centipawns for a piece on a square.
#[inline]
pub fn pst_bonus(piece: Piece, sq: Square, color: Color, phase: Phase) -> Value {
    let table = match piece {
        Piece::Pawn => &PAWN_PST,
        Piece::Knight => &KNIGHT_PST,
        Piece::Bishop => &BISHOP_PST,
        Piece::Rook => &ROOK_PST,
        Piece::Queen => &QUEEN_PST,
        Piece::King => match phase {
            Phase::Middlegame => &KING_PST_MG,
            Phase::Endgame => &KING_PST_EG,
        },
    };
    table[pst_index(sq, color)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_phase_threshold() {
        assert_eq!(game_phase(&Board::default()), Phase::Middlegame);
        // King + rook each: 4 pieces
        let board = Board::from_str("4k3/7r/8/8/8/8/R7/4K3 w - - 0 1").unwrap();
        assert_eq!(game_phase(&board), Phase::Endgame);
    }

    #[test]
    fn test_pst_mirrors_by_color() {
        // e4 for White must read the same entry as e5 for Black
        let white = pst_bonus(Piece::Pawn, Square::E4, Color::White, Phase::Middlegame);
        let black = pst_bonus(Piece::Pawn, Square::E5, Color::Black, Phase::Middlegame);
        assert_eq!(white, black);
        assert_eq!(white, 20);
    }

    #[test]
    fn test_unmoved_center_pawns_are_nudged_forward() {
        let d2 = pst_bonus(Piece::Pawn, Square::D2, Color::White, Phase::Middlegame);
        let d4 = pst_bonus(Piece::Pawn, Square::D4, Color::White, Phase::Middlegame);
        assert!(d4 > d2);
    }

    #[test]
    fn test_king_tables_differ_by_phase() {
        // A centralized king is a liability in the middlegame, an asset late
        let mg = pst_bonus(Piece::King, Square::E4, Color::White, Phase::Middlegame);
        let eg = pst_bonus(Piece::King, Square::E4, Color::White, Phase::Endgame);
        assert!(mg < 0);
        assert!(eg > 0);
    }
}
