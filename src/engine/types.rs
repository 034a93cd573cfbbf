//! Core domain types: teams, piece kinds, game status, and errors.

use std::fmt;

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    White,
    Black,
}

impl Team {
    /// Signed sense used to mirror pawn direction and rank-relative logic:
    /// White = +1, Black = -1.
    #[inline]
    pub const fn sense(self) -> i8 {
        match self {
            Team::White => 1,
            Team::Black => -1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Team::White => Team::Black,
            Team::Black => Team::White,
        }
    }

    /// Rank index of this team's back rank (where its pieces start).
    #[inline]
    pub const fn home_rank(self) -> i8 {
        match self {
            Team::White => 0,
            Team::Black => 7,
        }
    }

    /// Rank index a pawn of this team promotes on.
    #[inline]
    pub const fn promotion_rank(self) -> i8 {
        match self {
            Team::White => 7,
            Team::Black => 0,
        }
    }

    /// Rank index a pawn of this team captures en passant from.
    #[inline]
    pub const fn en_passant_rank(self) -> i8 {
        match self {
            Team::White => 4,
            Team::Black => 3,
        }
    }
}

impl std::ops::Not for Team {
    type Output = Self;
    fn not(self) -> Self {
        self.opponent()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::White => write!(f, "white"),
            Team::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceKind
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    /// All piece kinds in order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Single uppercase letter for White, lowercase for Black (FEN style).
    pub fn to_char(self, team: Team) -> char {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match team {
            Team::White => c.to_ascii_uppercase(),
            Team::Black => c,
        }
    }

    /// Parse a FEN piece character; the case carries the team.
    pub fn from_char(c: char) -> Option<(Team, PieceKind)> {
        let team = if c.is_ascii_uppercase() {
            Team::White
        } else {
            Team::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'r' => PieceKind::Rook,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some((team, kind))
    }

    /// Uppercase SAN letter (`N`, `B`, `R`, `Q`, `K`; `P` for pawns).
    pub fn san_letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "pawn"),
            PieceKind::Rook => write!(f, "rook"),
            PieceKind::Knight => write!(f, "knight"),
            PieceKind::Bishop => write!(f, "bishop"),
            PieceKind::Queen => write!(f, "queen"),
            PieceKind::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameStatus & DrawReason
// ---------------------------------------------------------------------------

/// Current status of a game, always describing the side to move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw(reason) => reason.as_str(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw(_)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
}

impl DrawReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DrawReason::FiftyMoveRule => "fifty_move_rule",
            DrawReason::ThreefoldRepetition => "threefold_repetition",
            DrawReason::InsufficientMaterial => "insufficient_material",
        }
    }
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// Discrete event emitted after a committed move, for the presentation
/// layer to map to audio/animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    MoveCompleted,
    CaptureCompleted,
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the rules engine.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("malformed coordinate: {0:?}")]
    MalformedCoordinate(String),

    #[error("malformed FEN: {0}")]
    MalformedFen(String),

    #[error("illegal move: {from} -> {to}: {reason}")]
    IllegalMove {
        from: String,
        to: String,
        reason: String,
    },

    /// Invariant violation — the board no longer holds a king for `{0}`.
    /// Indicates corrupted state, not a recoverable condition.
    #[error("no {0} king on the board")]
    NoKingFound(Team),

    #[error("promotion pending: a piece kind must be chosen first")]
    PromotionPending,

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("game is already over: {0}")]
    GameOver(String),

    #[error("no piece with id {0}")]
    NoSuchPiece(usize),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_toggle() {
        assert_eq!(!Team::White, Team::Black);
        assert_eq!(!Team::Black, Team::White);
        assert_eq!(Team::White.opponent(), Team::Black);
    }

    #[test]
    fn team_sense() {
        assert_eq!(Team::White.sense(), 1);
        assert_eq!(Team::Black.sense(), -1);
    }

    #[test]
    fn team_relative_ranks() {
        assert_eq!(Team::White.home_rank(), 0);
        assert_eq!(Team::Black.home_rank(), 7);
        assert_eq!(Team::White.promotion_rank(), 7);
        assert_eq!(Team::Black.promotion_rank(), 0);
        assert_eq!(Team::White.en_passant_rank(), 4);
        assert_eq!(Team::Black.en_passant_rank(), 3);
    }

    #[test]
    fn piece_kind_char_round_trip() {
        for kind in PieceKind::ALL {
            let wc = kind.to_char(Team::White);
            let bc = kind.to_char(Team::Black);
            assert!(wc.is_ascii_uppercase());
            assert!(bc.is_ascii_lowercase());
            assert_eq!(PieceKind::from_char(wc), Some((Team::White, kind)));
            assert_eq!(PieceKind::from_char(bc), Some((Team::Black, kind)));
        }
    }

    #[test]
    fn piece_kind_from_char_invalid() {
        assert_eq!(PieceKind::from_char('x'), None);
        assert_eq!(PieceKind::from_char('1'), None);
    }

    #[test]
    fn game_status_strings() {
        assert_eq!(GameStatus::Active.as_str(), "active");
        assert_eq!(GameStatus::Check.as_str(), "check");
        assert_eq!(GameStatus::Checkmate.as_str(), "checkmate");
        assert_eq!(GameStatus::Stalemate.as_str(), "stalemate");
        assert_eq!(
            GameStatus::Draw(DrawReason::ThreefoldRepetition).as_str(),
            "threefold_repetition"
        );
    }

    #[test]
    fn game_status_is_game_over() {
        assert!(!GameStatus::Active.is_game_over());
        assert!(!GameStatus::Check.is_game_over());
        assert!(GameStatus::Checkmate.is_game_over());
        assert!(GameStatus::Stalemate.is_game_over());
        assert!(GameStatus::Draw(DrawReason::FiftyMoveRule).is_game_over());
    }

    #[test]
    fn error_display() {
        let err = ChessError::IllegalMove {
            from: "e2".into(),
            to: "e5".into(),
            reason: "no such movement".into(),
        };
        assert_eq!(err.to_string(), "illegal move: e2 -> e5: no such movement");
        assert_eq!(
            ChessError::NoKingFound(Team::Black).to_string(),
            "no black king on the board"
        );
    }
}
