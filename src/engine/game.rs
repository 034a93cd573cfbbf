//! Stateful game controller wrapping the board.
//!
//! `Game` is the type the outside world talks to: it validates proposed
//! moves through the legality engine, commits them, records notation,
//! drives the turn change, and re-evaluates check/mate/stalemate/draw
//! after every move. Promotion is two-phase: the move is applied but the
//! turn is held until a piece kind is chosen.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::engine::board::Board;
use crate::engine::coord::Coord;
use crate::engine::piece::{Piece, PieceId};
use crate::engine::rules;
use crate::engine::san;
use crate::engine::types::{
    ChessError, DrawReason, GameEvent, GameStatus, PieceKind, Team,
};
use crate::models::{GameEndNotice, GameSnapshot, GameStateView};

// =========================================================================
// MoveReport
// =========================================================================

/// Outcome of a committed move, handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    /// Finalized SAN, `None` while a promotion choice is still pending.
    pub san: Option<String>,
    /// What the presentation layer should play/animate.
    pub event: GameEvent,
    /// Status for the side now to move.
    pub status: GameStatus,
    /// True when the caller must supply a promotion kind before play
    /// continues.
    pub promotion_pending: bool,
}

/// A pawn move applied but awaiting its promotion kind.
#[derive(Clone, Debug)]
struct PendingPromotion {
    pawn: PieceId,
    target: Coord,
    san_base: String,
    captured: bool,
}

// =========================================================================
// Game
// =========================================================================

/// A complete chess game with history and status tracking.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    status: GameStatus,
    pending_promotion: Option<PendingPromotion>,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,

    starting_fen: String,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A new game from the standard starting position.
    pub fn new() -> Self {
        let board = Board::starting();
        Self::wrap(board).expect("starting position is always valid")
    }

    /// A new game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Self::wrap(Board::from_fen(fen)?)
    }

    /// A new game from an explicit configuration (custom FEN or default
    /// start).
    pub fn with_config(config: &GameConfig) -> Result<Self, ChessError> {
        match config.initial_fen.as_deref() {
            Some(fen) => Self::from_fen(fen),
            None => Ok(Self::new()),
        }
    }

    fn wrap(board: Board) -> Result<Self, ChessError> {
        let starting_fen = board.to_fen();
        let status = compute_status(&board)?;
        let game = Game {
            board,
            status,
            pending_promotion: None,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            starting_fen,
        };
        tracing::debug!(id = %game.id, fen = %game.starting_fen, "game created");
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn side_to_move(&self) -> Team {
        self.board.turn
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// True while a promotion awaits its piece kind.
    pub fn promotion_pending(&self) -> bool {
        self.pending_promotion.is_some()
    }

    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }

    pub fn starting_fen(&self) -> &str {
        &self.starting_fen
    }

    /// Recorded SAN strings in play order.
    pub fn move_list(&self) -> &[String] {
        &self.board.move_list
    }

    /// The piece occupying a square, if any.
    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.board.piece_at(coord)
    }

    /// Every square the piece may legally move to (move-hint highlighting).
    pub fn legal_destinations(&self, id: PieceId) -> Result<Vec<Coord>, ChessError> {
        rules::legal_destinations(&self.board, id)
    }

    /// Terminal notification for the UI, when the game has ended.
    pub fn game_end(&self) -> Option<GameEndNotice> {
        if !self.status.is_game_over() {
            return None;
        }
        Some(GameEndNotice {
            verdict: self.status.as_str().to_string(),
            side: self.board.turn.to_string(),
        })
    }

    // -----------------------------------------------------------------
    // Proposing moves
    // -----------------------------------------------------------------

    /// Validate and, when legal, commit a move of piece `id` to `target`.
    ///
    /// On an illegal proposal the board is left untouched and an error
    /// describes the rejection. A pawn reaching its final rank leaves the
    /// game in the promotion-pending state: the turn does not change and
    /// nothing is recorded until [`Game::choose_promotion`] is called.
    pub fn propose_move(&mut self, id: PieceId, target: Coord) -> Result<MoveReport, ChessError> {
        if self.pending_promotion.is_some() {
            return Err(ChessError::PromotionPending);
        }
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }

        let piece = self.board.piece_checked(id)?;
        let from = piece.coord;
        let team = piece.team;
        let kind = piece.kind;
        if team != self.board.turn {
            return Err(ChessError::IllegalMove {
                from: from.to_algebraic(),
                to: target.to_algebraic(),
                reason: format!("it is not {team}'s turn"),
            });
        }

        let Some(verdict) = rules::classify(&self.board, id, target)? else {
            tracing::warn!(from = %from, to = %target, "rejected illegal move");
            return Err(ChessError::IllegalMove {
                from: from.to_algebraic(),
                to: target.to_algebraic(),
                reason: "not a legal move for this piece".to_string(),
            });
        };

        // SAN needs the pre-move board for disambiguation.
        let san_base = san::record(&self.board, id, target, &verdict)?;
        let captured = verdict.is_capture();

        rules::commit(&mut self.board, id, target, &verdict)?;

        // A pawn on its final rank pauses the move until a kind is chosen.
        if kind == PieceKind::Pawn && target.rank == team.promotion_rank() {
            self.pending_promotion = Some(PendingPromotion {
                pawn: id,
                target,
                san_base,
                captured,
            });
            return Ok(MoveReport {
                san: None,
                event: event_for(captured),
                status: self.status.clone(),
                promotion_pending: true,
            });
        }

        let keep_vulnerable = verdict.double_step.then_some(id);
        self.finish_move(san_base, captured, kind == PieceKind::Pawn, keep_vulnerable)
    }

    /// Resolve a pending promotion with the chosen piece kind and let the
    /// turn change proceed.
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<MoveReport, ChessError> {
        if matches!(kind, PieceKind::Pawn | PieceKind::King) {
            return Err(ChessError::InvalidPromotion(kind.to_string()));
        }
        let Some(pending) = self.pending_promotion.take() else {
            return Err(ChessError::IllegalMove {
                from: String::new(),
                to: String::new(),
                reason: "no promotion is pending".to_string(),
            });
        };

        let pawn = self
            .board
            .lift_piece(pending.pawn)
            .ok_or(ChessError::NoSuchPiece(pending.pawn.0))?;
        let new_id = self.board.place_piece(kind, pawn.team, pending.target);
        if let Some(piece) = self.board.piece_mut(new_id) {
            piece.has_moved = true;
        }

        let san = format!("{}={}", pending.san_base, kind.san_letter());
        self.finish_move(san, pending.captured, true, None)
    }

    /// Parse and play a SAN move (`e4`, `Nf3`, `O-O`, `e8=Q`, …).
    pub fn play_san(&mut self, san_str: &str) -> Result<MoveReport, ChessError> {
        let parsed = san::parse(&self.board, san_str)?;

        // A promotion suffix only makes sense on a pawn reaching its final
        // rank; reject before touching the board.
        if let Some(kind) = parsed.promotion {
            let promotes = self.board.piece(parsed.piece).is_some_and(|p| {
                p.kind == PieceKind::Pawn && parsed.target.rank == p.team.promotion_rank()
            });
            if !promotes {
                return Err(ChessError::InvalidPromotion(kind.to_string()));
            }
        }

        let report = self.propose_move(parsed.piece, parsed.target)?;
        if report.promotion_pending {
            return match parsed.promotion {
                Some(kind) => self.choose_promotion(kind),
                None => Err(ChessError::PromotionPending),
            };
        }
        Ok(report)
    }

    // -----------------------------------------------------------------
    // Turn change
    // -----------------------------------------------------------------

    fn finish_move(
        &mut self,
        san_base: String,
        captured: bool,
        pawn_move: bool,
        keep_vulnerable: Option<PieceId>,
    ) -> Result<MoveReport, ChessError> {
        self.board.advance_turn(captured || pawn_move, keep_vulnerable);
        self.status = compute_status(&self.board)?;

        let san = match self.status {
            GameStatus::Checkmate => format!("{san_base}#"),
            GameStatus::Check => format!("{san_base}+"),
            _ => san_base,
        };
        self.board.move_list.push(san.clone());

        if self.status.is_game_over() {
            tracing::info!(
                status = %self.status,
                side = %self.board.turn,
                "game over"
            );
        }

        Ok(MoveReport {
            san: Some(san),
            event: event_for(captured),
            status: self.status.clone(),
            promotion_pending: false,
        })
    }

    // -----------------------------------------------------------------
    // Position loading & snapshots
    // -----------------------------------------------------------------

    /// Full reset from a FEN string, or to the default start when `None`.
    /// All history is discarded.
    pub fn load_position(&mut self, fen: Option<&str>) -> Result<(), ChessError> {
        let board = match fen {
            Some(fen) => Board::from_fen(fen)?,
            None => Board::starting(),
        };
        self.starting_fen = board.to_fen();
        self.status = compute_status(&board)?;
        self.board = board;
        self.pending_promotion = None;
        Ok(())
    }

    /// Everything needed to reconstruct this game later.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            fen: self.to_fen(),
            starting_fen: self.starting_fen.clone(),
            moves: self.board.move_list.clone(),
            position_history: self.board.position_history.clone(),
        }
    }

    /// Rebuild a game from a snapshot.
    pub fn restore(snapshot: &GameSnapshot) -> Result<Self, ChessError> {
        let mut board = Board::from_fen(&snapshot.fen)?;
        board.move_list = snapshot.moves.clone();
        board.position_history = snapshot.position_history.clone();
        if board.position_history.is_empty() {
            board.position_history.push(board.to_fen());
        }
        let mut game = Self::wrap(board)?;
        game.starting_fen = snapshot.starting_fen.clone();
        Ok(game)
    }

    /// The serde-facing view of the current state for UI consumption.
    pub fn state_view(&self) -> GameStateView {
        GameStateView {
            fen: self.to_fen(),
            board: self.board_array(),
            turn: self.board.turn.to_string(),
            status: self.status.as_str().to_string(),
            moves: self.board.move_list.clone(),
            game_end: self.game_end(),
        }
    }

    /// 8×8 board array (rank 8 first), empty squares as empty strings,
    /// pieces as `"wP"`, `"bK"`, etc.
    fn board_array(&self) -> [[String; 8]; 8] {
        let mut array = std::array::from_fn(|_| std::array::from_fn(|_| String::new()));
        for (row, cells) in array.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                let coord = Coord::new(col as i8, 7 - row as i8);
                if let Some(piece) = self.board.piece_at(coord) {
                    let side = match piece.team {
                        Team::White => 'w',
                        Team::Black => 'b',
                    };
                    *cell = format!("{}{}", side, piece.kind.san_letter());
                }
            }
        }
        array
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn event_for(captured: bool) -> GameEvent {
    if captured {
        GameEvent::CaptureCompleted
    } else {
        GameEvent::MoveCompleted
    }
}

// =========================================================================
// Status detection
// =========================================================================

fn compute_status(board: &Board) -> Result<GameStatus, ChessError> {
    let in_check = rules::in_check(board, board.turn)?;

    if !rules::side_has_moves(board)? {
        return Ok(if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        });
    }

    // Draw conditions, cheapest first.
    if board.halfmove_clock >= 100 {
        return Ok(GameStatus::Draw(DrawReason::FiftyMoveRule));
    }
    if is_threefold_repetition(board) {
        return Ok(GameStatus::Draw(DrawReason::ThreefoldRepetition));
    }
    if is_insufficient_material(board) {
        return Ok(GameStatus::Draw(DrawReason::InsufficientMaterial));
    }

    Ok(if in_check {
        GameStatus::Check
    } else {
        GameStatus::Active
    })
}

/// Any position (board + turn + castling + en passant, counters excluded)
/// reached three or more times.
fn is_threefold_repetition(board: &Board) -> bool {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for fen in &board.position_history {
        let key: String = fen.split(' ').take(4).collect::<Vec<_>>().join(" ");
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.values().any(|&n| n >= 3)
}

/// The fixed insufficient-material table: fewer than four pieces with no
/// rook/queen/pawn, or exactly four with no rook/queen/pawn/knight and the
/// two remaining bishops on opposite teams and same-shade squares.
fn is_insufficient_material(board: &Board) -> bool {
    let pieces: Vec<&Piece> = board.live_pieces().collect();

    if pieces.len() < 4 {
        return pieces.iter().all(|p| {
            !matches!(p.kind, PieceKind::Rook | PieceKind::Queen | PieceKind::Pawn)
        });
    }

    if pieces.len() == 4 {
        if pieces.iter().any(|p| {
            matches!(
                p.kind,
                PieceKind::Rook | PieceKind::Queen | PieceKind::Pawn | PieceKind::Knight
            )
        }) {
            return false;
        }
        let bishops: Vec<&&Piece> = pieces
            .iter()
            .filter(|p| p.kind == PieceKind::Bishop)
            .collect();
        if bishops.len() == 2
            && bishops[0].team != bishops[1].team
            && board.square(bishops[0].coord).shade == board.square(bishops[1].coord).shade
        {
            return true;
        }
    }

    false
}

// =========================================================================
// Tests
// =========================================================================
