//! Piece records and their stable identifiers.

use std::fmt;

use crate::engine::coord::Coord;
use crate::engine::types::{PieceKind, Team};

// ---------------------------------------------------------------------------
// PieceId
// ---------------------------------------------------------------------------

/// Stable handle for a piece: its slot index in the board's piece table.
/// Slots are never reused within a game, so an id stays valid (though the
/// piece it names may have been captured).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceId(pub usize);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// Index into [`Piece::castling_rooks`] for the kingside rook.
pub const KINGSIDE: usize = 0;
/// Index into [`Piece::castling_rooks`] for the queenside rook.
pub const QUEENSIDE: usize = 1;

/// A live piece. Owned by the board; a capture removes the record from the
/// board's piece table, so no piece ever exists on two squares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub team: Team,
    /// Current square; always agrees with that square's occupant.
    pub coord: Coord,
    /// Set once the piece has made any move (gates `Initial` rules).
    pub has_moved: bool,
    /// True only for the one turn following this pawn's two-square advance.
    pub en_passant_vulnerable: bool,
    /// Kings only: the rooks usable for castling (`[kingside, queenside]`),
    /// `None` where no rook started on the corresponding home square.
    pub castling_rooks: [Option<PieceId>; 2],
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind, team: Team, coord: Coord) -> Self {
        Piece {
            id,
            kind,
            team,
            coord,
            has_moved: false,
            en_passant_vulnerable: false,
            castling_rooks: [None, None],
        }
    }

    /// FEN character for this piece (case encodes the team).
    #[inline]
    pub fn fen_char(&self) -> char {
        self.kind.to_char(self.team)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.team, self.kind, self.coord)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
