//! Board state: the 8×8 square grid, the live piece set, turn, rights,
//! counters, and the recorded move/position histories.
//!
//! The board owns every `Piece` and is the only place occupancy is mutated.
//! Pieces live in a slot table indexed by `PieceId`; capturing a piece
//! vacates its slot, so ids stay stable for the whole game.

use crate::engine::coord::{Coord, SquareShade};
use crate::engine::piece::{KINGSIDE, Piece, PieceId, QUEENSIDE};
use crate::engine::types::{ChessError, PieceKind, Team};

/// The standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// One board square: a fixed coordinate, its colour class, and at most one
/// occupying piece. Allocated once at board construction, never recreated
/// during play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Square {
    pub coord: Coord,
    pub shade: SquareShade,
    pub occupant: Option<PieceId>,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [Square; 64],
    pieces: Vec<Option<Piece>>,
    /// Whose turn it is.
    pub turn: Team,
    /// Square passed over by the last two-square pawn advance, valid for
    /// exactly one following move.
    pub en_passant_target: Option<Coord>,
    /// Half-moves since the last pawn move or capture.
    pub halfmove_clock: u16,
    /// Starts at 1, incremented after Black moves.
    pub fullmove_number: u16,
    /// Recorded algebraic move strings, in play order.
    pub move_list: Vec<String>,
    /// FEN of every position reached (repetition counting compares the
    /// first four fields only).
    pub position_history: Vec<String>,
}

#[inline]
fn index(coord: Coord) -> usize {
    (coord.rank * 8 + coord.file) as usize
}

impl Board {
    /// An empty board with no pieces and no history.
    pub fn empty() -> Self {
        let squares = std::array::from_fn(|i| {
            let coord = Coord::new((i % 8) as i8, (i / 8) as i8);
            Square {
                coord,
                shade: coord.shade(),
                occupant: None,
            }
        });
        Board {
            squares,
            pieces: Vec::new(),
            turn: Team::White,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            move_list: Vec::new(),
            position_history: Vec::new(),
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(START_FEN).expect("starting FEN is always valid")
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Add a new piece to the board. The target square must be empty.
    pub fn place_piece(&mut self, kind: PieceKind, team: Team, coord: Coord) -> PieceId {
        debug_assert!(
            self.squares[index(coord)].occupant.is_none(),
            "placing {team} {kind} on occupied {coord}"
        );
        let id = PieceId(self.pieces.len());
        self.pieces.push(Some(Piece::new(id, kind, team, coord)));
        self.squares[index(coord)].occupant = Some(id);
        id
    }

    /// Remove a piece from play, vacating its slot and its square.
    pub fn lift_piece(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.get_mut(id.0)?.take()?;
        self.squares[index(piece.coord)].occupant = None;
        Some(piece)
    }

    /// Move a piece to an empty square, keeping square occupancy and the
    /// piece's own coordinate in agreement. Any capture must already be
    /// resolved via [`Board::lift_piece`].
    pub fn relocate(&mut self, id: PieceId, to: Coord) {
        let from = match self.piece(id) {
            Some(p) => p.coord,
            None => return,
        };
        debug_assert!(
            self.squares[index(to)].occupant.is_none(),
            "relocating onto occupied {to}"
        );
        self.squares[index(from)].occupant = None;
        self.squares[index(to)].occupant = Some(id);
        if let Some(p) = self.pieces[id.0].as_mut() {
            p.coord = to;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn square(&self, coord: Coord) -> &Square {
        &self.squares[index(coord)]
    }

    /// The piece with the given id, if still in play.
    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Like [`Board::piece`] but with an error for dead/unknown ids.
    pub fn piece_checked(&self, id: PieceId) -> Result<&Piece, ChessError> {
        self.piece(id).ok_or(ChessError::NoSuchPiece(id.0))
    }

    #[inline]
    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// All pieces still in play.
    pub fn live_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().flatten()
    }

    /// The piece occupying a square, if any.
    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.square(coord).occupant.and_then(|id| self.piece(id))
    }

    /// The king of the given team. A missing king is corrupted state.
    pub fn king(&self, team: Team) -> Result<&Piece, ChessError> {
        self.live_pieces()
            .find(|p| p.team == team && p.kind == PieceKind::King)
            .ok_or(ChessError::NoKingFound(team))
    }

    // -----------------------------------------------------------------------
    // Turn bookkeeping
    // -----------------------------------------------------------------------

    /// Flip the turn and update the derived counters/flags: the halfmove
    /// clock resets on a pawn move or capture, the fullmove number advances
    /// after Black, every `en_passant_vulnerable` flag is cleared except
    /// the mover's newly-set one, and the reached position joins the
    /// history.
    pub fn advance_turn(&mut self, reset_clock: bool, keep_vulnerable: Option<PieceId>) {
        self.turn = !self.turn;
        if reset_clock {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.turn == Team::White {
            self.fullmove_number += 1;
        }
        for slot in &mut self.pieces {
            if let Some(piece) = slot
                && Some(piece.id) != keep_vulnerable
            {
                piece.en_passant_vulnerable = false;
            }
        }
        self.position_history.push(self.to_fen());
    }

    // -----------------------------------------------------------------------
    // FEN parsing
    // -----------------------------------------------------------------------

    /// Parse a FEN string into a fresh board.
    ///
    /// Validates all six fields and requires exactly one king per team.
    /// Castling availability is reconstructed as `has_moved` flags on the
    /// king and its linked rooks; pawns off their start rank are marked
    /// moved; an en-passant target marks the bypassed pawn vulnerable.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::MalformedFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut board = Board::empty();

        // ----- Field 1: piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::MalformedFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as i8; // FEN starts from rank 8
            let mut file: i8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::MalformedFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::MalformedFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as i8;
                } else if let Some((team, kind)) = PieceKind::from_char(ch) {
                    board.place_piece(kind, team, Coord::new(file, rank));
                    file += 1;
                } else {
                    return Err(ChessError::MalformedFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::MalformedFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        // Exactly one king per team.
        for team in [Team::White, Team::Black] {
            let kings = board
                .live_pieces()
                .filter(|p| p.team == team && p.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(ChessError::MalformedFen(format!(
                    "{team} has {kings} kings (expected 1)"
                )));
            }
        }

        // ----- Field 2: side to move -----
        board.turn = match fields[1] {
            "w" => Team::White,
            "b" => Team::Black,
            other => {
                return Err(ChessError::MalformedFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: castling availability -----
        let (mut wk, mut wq, mut bk, mut bq) = (false, false, false, false);
        if fields[2] != "-" {
            for ch in fields[2].chars() {
                match ch {
                    'K' => wk = true,
                    'Q' => wq = true,
                    'k' => bk = true,
                    'q' => bq = true,
                    _ => {
                        return Err(ChessError::MalformedFen(format!(
                            "invalid castling string: '{}'",
                            fields[2]
                        )));
                    }
                }
            }
        }
        board.link_castling_rooks();
        board.apply_castling_rights(Team::White, wk, wq);
        board.apply_castling_rights(Team::Black, bk, bq);

        // Pawns off their start rank have necessarily moved.
        for slot in &mut board.pieces {
            if let Some(piece) = slot
                && piece.kind == PieceKind::Pawn
            {
                let start_rank = piece.team.home_rank() + piece.team.sense();
                if piece.coord.rank != start_rank {
                    piece.has_moved = true;
                }
            }
        }

        // ----- Field 4: en-passant target square -----
        if fields[3] != "-" {
            let target = Coord::from_algebraic(fields[3]).map_err(|_| {
                ChessError::MalformedFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            if target.rank != 2 && target.rank != 5 {
                return Err(ChessError::MalformedFen(format!(
                    "en passant square {} is not on rank 3 or 6",
                    fields[3]
                )));
            }
            board.en_passant_target = Some(target);
            // Mark the pawn that just double-stepped past the target.
            let pawn_rank = if target.rank == 2 { 3 } else { 4 };
            let pawn_coord = Coord::new(target.file, pawn_rank);
            let pawn_id = board
                .piece_at(pawn_coord)
                .filter(|p| p.kind == PieceKind::Pawn)
                .map(|p| p.id);
            if let Some(id) = pawn_id
                && let Some(pawn) = board.piece_mut(id)
            {
                pawn.en_passant_vulnerable = true;
            }
        }

        // ----- Field 5: halfmove clock -----
        board.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::MalformedFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: fullmove number -----
        board.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::MalformedFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if board.fullmove_number == 0 {
            return Err(ChessError::MalformedFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        board.position_history.push(board.to_fen());
        Ok(board)
    }

    /// Link each king to the rooks on its team's home corners.
    fn link_castling_rooks(&mut self) {
        for team in [Team::White, Team::Black] {
            let home = team.home_rank();
            let corner_rook = |board: &Board, file: i8| {
                board
                    .piece_at(Coord::new(file, home))
                    .filter(|p| p.kind == PieceKind::Rook && p.team == team)
                    .map(|p| p.id)
            };
            let kingside = corner_rook(self, 7);
            let queenside = corner_rook(self, 0);
            let king_id = self
                .live_pieces()
                .find(|p| p.team == team && p.kind == PieceKind::King)
                .map(|p| p.id);
            if let Some(id) = king_id
                && let Some(king) = self.piece_mut(id)
            {
                king.castling_rooks = [kingside, queenside];
            }
        }
    }

    /// Translate FEN castling letters into `has_moved` flags. A letter with
    /// no matching rook carries no legal meaning and normalizes away on
    /// export.
    fn apply_castling_rights(&mut self, team: Team, kingside: bool, queenside: bool) {
        let Ok(king) = self.king(team) else { return };
        let king_id = king.id;
        let rooks = king.castling_rooks;

        if let Some(k) = self.piece_mut(king_id) {
            k.has_moved = !(kingside || queenside);
        }
        if let Some(rook_id) = rooks[KINGSIDE]
            && let Some(rook) = self.piece_mut(rook_id)
        {
            rook.has_moved = !kingside;
        }
        if let Some(rook_id) = rooks[QUEENSIDE]
            && let Some(rook) = self.piece_mut(rook_id)
        {
            rook.has_moved = !queenside;
        }
    }

    // -----------------------------------------------------------------------
    // FEN serialization
    // -----------------------------------------------------------------------

    /// Export the position as a FEN string (standard six fields).
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: piece placement -----
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Coord::new(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        // ----- Field 2: side to move -----
        fen.push(' ');
        fen.push(match self.turn {
            Team::White => 'w',
            Team::Black => 'b',
        });

        // ----- Field 3: castling availability -----
        fen.push(' ');
        let rights = self.castling_letters();
        if rights.is_empty() {
            fen.push('-');
        } else {
            fen.push_str(&rights);
        }

        // ----- Field 4: en passant -----
        fen.push(' ');
        match self.en_passant_target {
            Some(coord) => fen.push_str(&coord.to_algebraic()),
            None => fen.push('-'),
        }

        // ----- Fields 5 & 6: clocks -----
        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }

    /// Castling letters with actual legal meaning: king unmoved and the
    /// linked rook alive and unmoved.
    fn castling_letters(&self) -> String {
        let mut letters = String::with_capacity(4);
        for (team, chars) in [(Team::White, ['K', 'Q']), (Team::Black, ['k', 'q'])] {
            let Ok(king) = self.king(team) else { continue };
            if king.has_moved {
                continue;
            }
            for (side, ch) in [(KINGSIDE, chars[0]), (QUEENSIDE, chars[1])] {
                if let Some(rook_id) = king.castling_rooks[side]
                    && let Some(rook) = self.piece(rook_id)
                    && !rook.has_moved
                {
                    letters.push(ch);
                }
            }
        }
        letters
    }

    /// The first four FEN fields (board, turn, castling, en passant) — the
    /// identity used for repetition counting, move counters excluded.
    pub fn position_key(&self) -> String {
        let fen = self.to_fen();
        let mut iter = fen.split(' ');
        let mut key = String::with_capacity(fen.len());
        for i in 0..4 {
            if i > 0 {
                key.push(' ');
            }
            key.push_str(iter.next().unwrap_or(""));
        }
        key
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank as u8) as char);
            s.push(' ');
            for file in 0..8 {
                let ch = match self.piece_at(Coord::new(file, rank)) {
                    Some(piece) => piece.fen_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }

    // -----------------------------------------------------------------------
    // Occupancy sanity check (debug builds)
    // -----------------------------------------------------------------------

    /// Verify that square occupancy and piece coordinates agree.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for square in &self.squares {
            if let Some(id) = square.occupant {
                let piece = self.piece(id).expect("occupant id must be live");
                assert_eq!(
                    piece.coord, square.coord,
                    "square {} holds {} which claims {}",
                    square.coord, piece.id, piece.coord
                );
            }
        }
        for piece in self.live_pieces() {
            assert_eq!(
                self.square(piece.coord).occupant,
                Some(piece.id),
                "{piece} not registered on its square"
            );
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
