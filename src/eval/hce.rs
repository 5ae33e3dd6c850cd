//! Heuristic position evaluation.
//!
//! Produces a white-relative [`Score`] in pawn units from:
//! - Terminal-state short-circuits (checkmate, stalemate, dead draws)
//! - Material balance
//! - Piece-Square Tables (king tables switch on game phase)
//! - A small mobility nudge for the side to move
//!
//! The function is pure: it never mutates the board it is given.
//!
//! Draw detection covers stalemate and insufficient material only. The
//! fifty-move and threefold-repetition rules need move history, which a
//! single `Board` snapshot does not carry; tracking those is the caller's
//! job if it keeps a game record.

use super::pst::{game_phase, pst_bonus};
use crate::types::{
    piece_value, BitBoard, Board, BoardStatus, Color, MoveGen, Piece, Score, Value, ALL_SQUARES,
    EMPTY, SCORE_MATE,
};

/// Weight of one legal move in pawn units.
///
/// The mobility term is signed for the side to move, so it is deliberately
/// not white-relative on its own: it nudges the total toward whichever side
/// currently has more options.
const MOBILITY_WEIGHT: f64 = 0.01;

/// Light squares bitboard (b1, d1, ... pattern; a1 is dark)
const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

/// Evaluate the position from White's perspective.
///
/// Checkmate returns exactly `±SCORE_MATE` (negative when White is the side
/// mated); stalemate and insufficient material return exactly 0.
pub fn evaluate(board: &Board) -> Score {
    match board.status() {
        BoardStatus::Checkmate => {
            // The side to move has been mated
            return if board.side_to_move() == Color::White {
                Score::pawns(-SCORE_MATE)
            } else {
                Score::pawns(SCORE_MATE)
            };
        }
        BoardStatus::Stalemate => return Score::draw(),
        BoardStatus::Ongoing => {}
    }

    if is_insufficient_material(board) {
        return Score::draw();
    }

    let phase = game_phase(board);
    let mut cp: Value = 0;

    // Material and PST, summed per occupied square
    for sq in ALL_SQUARES {
        if let Some(piece) = board.piece_on(sq) {
            let color = board
                .color_on(sq)
                .expect("occupied square must have a color");
            let value = piece_value(piece) + pst_bonus(piece, sq, color, phase);
            match color {
                Color::White => cp += value,
                Color::Black => cp -= value,
            }
        }
    }

    let mut score = cp as f64 / 100.0;

    // Mobility for the side to move
    let mobility = MoveGen::new_legal(board).len() as f64 * MOBILITY_WEIGHT;
    match board.side_to_move() {
        Color::White => score += mobility,
        Color::Black => score -= mobility,
    }

    Score::pawns(score)
}

/// Check whether neither side has mating material.
///
/// The `chess` crate's `BoardStatus` only covers mate and stalemate, so the
/// dead-draw cases are detected here: bare kings, a single minor piece, or
/// bishops that all share one square color.
pub fn is_insufficient_material(board: &Board) -> bool {
    let heavy =
        board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if heavy != EMPTY {
        return false;
    }

    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    if (knights | bishops).popcnt() <= 1 {
        return true;
    }

    // Any number of same-colored bishops cannot force mate
    if *knights == EMPTY {
        let light = bishops & BitBoard::new(LIGHT_SQUARES);
        return light == *bishops || light == EMPTY;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // After 1. e4: small positional edge for White
    const E4_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

    #[test]
    fn test_starting_position_is_roughly_balanced() {
        let score = evaluate(&Board::default());
        // Material and tables cancel; only White's 20-move mobility remains
        assert!(score.raw() > 0.0);
        assert!(score.raw() <= 0.25);
    }

    #[test]
    fn test_e4_gives_white_an_edge() {
        let board = Board::from_str(E4_FEN).unwrap();
        assert!(evaluate(&board).raw() > 0.0);
    }

    #[test]
    fn test_material_advantage() {
        // White up a queen
        let board =
            Board::from_str("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert!(evaluate(&board).raw() > 8.0);
    }

    #[test]
    fn test_checkmate_is_mate_sentinel() {
        // Fool's mate: White to move and mated
        let board =
            Board::from_str("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(evaluate(&board).raw(), -SCORE_MATE);

        // Back-rank mate delivered by White: Black to move and mated
        let board = Board::from_str("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert_eq!(evaluate(&board).raw(), SCORE_MATE);
    }

    #[test]
    fn test_stalemate_is_draw() {
        // Black king in the corner, no legal moves, not in check
        let board = Board::from_str("k7/2Q5/8/8/8/8/8/K7 b - - 0 1").unwrap();
        assert_eq!(board.status(), BoardStatus::Stalemate);
        assert_eq!(evaluate(&board).raw(), 0.0);
    }

    #[test]
    fn test_insufficient_material_is_draw() {
        let kk = Board::from_str("k7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
        assert!(is_insufficient_material(&kk));
        assert_eq!(evaluate(&kk).raw(), 0.0);

        let kbk = Board::from_str("k7/8/8/8/8/8/8/5B1K w - - 0 1").unwrap();
        assert!(is_insufficient_material(&kbk));
        assert_eq!(evaluate(&kbk).raw(), 0.0);

        // Rook endings are not dead draws
        let krk = Board::from_str("k7/8/8/8/8/8/8/5R1K w - - 0 1").unwrap();
        assert!(!is_insufficient_material(&krk));
    }

    #[test]
    fn test_same_colored_bishops_cannot_mate() {
        // Two light-squared bishops: dead draw
        let same = Board::from_str("k7/8/8/8/8/3B4/8/4KB2 w - - 0 1").unwrap();
        assert!(is_insufficient_material(&same));
        assert_eq!(evaluate(&same).raw(), 0.0);

        // Opposite-colored bishop pair can still mate
        let opposite = Board::from_str("k7/8/8/8/8/8/8/2B1KB2 w - - 0 1").unwrap();
        assert!(!is_insufficient_material(&opposite));

        // Bishops split across the two sides, on different colors
        let split = Board::from_str("kb6/8/8/8/8/8/8/4KB2 w - - 0 1").unwrap();
        assert!(!is_insufficient_material(&split));

        // A knight alongside a bishop keeps mating chances
        let knight = Board::from_str("k7/8/8/8/8/8/8/3NKB2 w - - 0 1").unwrap();
        assert!(!is_insufficient_material(&knight));
    }

    #[test]
    fn test_color_mirror_antisymmetry() {
        // The 1. e4 position and its color-mirrored counterpart (Black has
        // played ...e5 from a flipped start, White to move) must evaluate to
        // exact negations: material and PSTs are antisymmetric, and the
        // mobility term follows the mirrored side to move.
        let p = Board::from_str(E4_FEN).unwrap();
        let mirrored =
            Board::from_str("rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 1").unwrap();
        let sum = evaluate(&p).raw() + evaluate(&mirrored).raw();
        assert!(sum.abs() < 1e-9);
    }

    #[test]
    fn test_evaluation_does_not_mutate_the_board() {
        let board = Board::from_str(E4_FEN).unwrap();
        let fen_before = board.to_string();
        let _ = evaluate(&board);
        assert_eq!(board.to_string(), fen_before);
        assert_eq!(board.side_to_move(), Color::Black);
    }
}
