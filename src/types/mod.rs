//! Core types for the move-advisory engine.
//!
//! # Design Principles
//! - Re-export `chess` crate types as the canonical source for board/move
//!   types; legality, move generation and FEN handling all live there and
//!   are never re-implemented here
//! - Define advisory-specific types (Score) with fixed conventions

mod score;

// Re-export our custom types
pub use score::{Score, SCORE_DRAW, SCORE_MATE, SCORE_NONE};

// Re-export chess crate types as canonical types
// This gives us a single source of truth and avoids confusion
pub use chess::{
    BitBoard,
    Board,
    BoardStatus,
    ChessMove as Move,
    Color,
    File,
    MoveGen,
    Piece,
    Rank,
    Square,
    ALL_SQUARES,
    EMPTY,
};

/// Centipawn value type (for piece values, PST entries)
pub type Value = i32;

// Piece values in centipawns: 1, 3, 3, 5, 9 pawns, with a large king
// value so king safety dominates positional terms
pub const PAWN_VALUE: Value = 100;
pub const KNIGHT_VALUE: Value = 300;
pub const BISHOP_VALUE: Value = 300;
pub const ROOK_VALUE: Value = 500;
pub const QUEEN_VALUE: Value = 900;
pub const KING_VALUE: Value = 10000;

/// Get the material value of a piece in centipawns
#[inline]
pub const fn piece_value(piece: Piece) -> Value {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}
