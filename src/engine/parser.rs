//! Parsing of UCI engine replies and move notation.
//!
//! Only the small subset of the protocol the adapter consumes is handled:
//! `info` lines carrying a score and principal variation, and the final
//! `bestmove` line that terminates a search.

use crate::types::{Board, Move, MoveGen};
use std::str::FromStr;

/// Score token from an `info` line, relative to the engine's side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawScore {
    /// Centipawns
    Cp(i32),
    /// Mate in N moves (negative: getting mated)
    Mate(i32),
}

/// A parsed `info` line.
#[derive(Debug, Clone, Default)]
pub struct InfoLine {
    /// Multi-PV rank (1 = best line)
    pub multipv: u32,
    /// Search depth reached
    pub depth: Option<u32>,
    /// Reported score, side-to-move relative
    pub score: Option<RawScore>,
    /// Principal variation as UCI move strings
    pub pv: Vec<String>,
}

/// Parse an `info` line. Returns `None` for lines that are not `info` or
/// carry neither a score nor a PV (e.g. `info string ...`).
pub fn parse_info(line: &str) -> Option<InfoLine> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("info") {
        return None;
    }

    let mut info = InfoLine {
        multipv: 1,
        ..Default::default()
    };

    while let Some(token) = parts.next() {
        match token {
            "depth" => {
                info.depth = parts.next().and_then(|t| t.parse().ok());
            }
            "multipv" => {
                if let Some(n) = parts.next().and_then(|t| t.parse().ok()) {
                    info.multipv = n;
                }
            }
            "score" => match parts.next() {
                Some("cp") => {
                    info.score = parts.next().and_then(|t| t.parse().ok()).map(RawScore::Cp);
                }
                Some("mate") => {
                    info.score = parts.next().and_then(|t| t.parse().ok()).map(RawScore::Mate);
                }
                _ => {}
            },
            "pv" => {
                // Remaining tokens are the principal variation
                info.pv = parts.map(str::to_string).collect();
                break;
            }
            _ => {}
        }
    }

    if info.score.is_none() && info.pv.is_empty() {
        return None;
    }
    Some(info)
}

/// Parse a `bestmove` line, returning the move string (`None` for
/// "bestmove (none)" replies from positions with no legal moves).
pub fn parse_bestmove(line: &str) -> Option<String> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    match parts.next() {
        Some("(none)") | Some("0000") | None => None,
        Some(m) => Some(m.to_string()),
    }
}

/// Parse a move string (e.g., "e2e4", "e7e8q") into a Move legal in the
/// given position. Returns `None` when no legal move matches.
pub fn parse_move(board: &Board, move_str: &str) -> Option<Move> {
    let move_str = move_str.trim();
    if move_str.len() < 4 {
        return None;
    }

    // get() bounds the slices at char boundaries; engine output is not
    // trusted to be ASCII
    let from = chess::Square::from_str(move_str.get(0..2)?).ok()?;
    let to = chess::Square::from_str(move_str.get(2..4)?).ok()?;

    let promo = if move_str.len() > 4 {
        match move_str.chars().nth(4)? {
            'q' | 'Q' => Some(chess::Piece::Queen),
            'r' | 'R' => Some(chess::Piece::Rook),
            'b' | 'B' => Some(chess::Piece::Bishop),
            'n' | 'N' => Some(chess::Piece::Knight),
            _ => None,
        }
    } else {
        None
    };

    // Find the matching legal move
    for m in MoveGen::new_legal(board) {
        if m.get_source() == from && m.get_dest() == to && m.get_promotion() == promo {
            return Some(m);
        }
    }

    None
}

/// Format a move to UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_move(m: Move) -> String {
    let mut s = format!("{}{}", m.get_source(), m.get_dest());
    if let Some(promo) = m.get_promotion() {
        let c = match promo {
            chess::Piece::Queen => 'q',
            chess::Piece::Rook => 'r',
            chess::Piece::Bishop => 'b',
            chess::Piece::Knight => 'n',
            _ => unreachable!(),
        };
        s.push(c);
    }
    s
}
