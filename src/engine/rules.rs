//! The legality engine.
//!
//! `classify` decides whether a piece may move to a target square and, when
//! it may, reports the matched movement kind plus everything commit and
//! notation need (capture victim, castling rook, double-step marker).
//!
//! Obstruction is recomputed per query as a pure value derived from current
//! occupancy — nothing here mutates shared state. The self-check filter
//! applies the candidate move to a scratch copy of the board and asks
//! whether any enemy piece then reaches the mover's king, so the caller's
//! board is left untouched on every path.

use crate::engine::board::Board;
use crate::engine::coord::{Coord, Offset};
use crate::engine::moves::{self, MoveKind, MoveRule};
use crate::engine::piece::{KINGSIDE, Piece, PieceId, QUEENSIDE};
use crate::engine::types::{ChessError, PieceKind, Team};

// =========================================================================
// Verdict types
// =========================================================================

/// Which wing a castling move targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

/// A legal castling move and the rook it relocates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastleMove {
    pub side: CastleSide,
    pub rook: PieceId,
}

/// A positive legality verdict: the matched movement kind plus the side
/// effects commit must perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegalMove {
    pub kind: MoveKind,
    /// Captured piece — the target occupant, or the bypassed pawn for an
    /// en-passant capture.
    pub victim: Option<PieceId>,
    pub en_passant: bool,
    pub castle: Option<CastleMove>,
    /// A pawn two-square advance (sets the en-passant window).
    pub double_step: bool,
}

impl LegalMove {
    fn plain(kind: MoveKind, victim: Option<PieceId>) -> Self {
        LegalMove {
            kind,
            victim,
            en_passant: false,
            castle: None,
            double_step: false,
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.victim.is_some()
    }
}

// =========================================================================
// Legality queries
// =========================================================================

/// Decide whether `id` may move to `target`.
///
/// `Ok(Some(_))` is a legal move, `Ok(None)` an illegal one. `Err` is
/// reserved for corrupted state (`NoSuchPiece`, `NoKingFound`), never for
/// plain illegality.
pub fn classify(
    board: &Board,
    id: PieceId,
    target: Coord,
) -> Result<Option<LegalMove>, ChessError> {
    let piece = board.piece_checked(id)?;
    let offset = piece.coord.offset_to(target, piece.team);
    let Some(rule) = find_rule(piece.kind, offset) else {
        return Ok(None);
    };

    match rule.kind {
        MoveKind::Quiet => classify_quiet(board, piece, target, offset, false),
        MoveKind::Capture => classify_capture(board, piece, target, offset),
        MoveKind::Slide | MoveKind::Jump => classify_slide(board, piece, target, offset, rule.kind),
        MoveKind::Initial => classify_initial(board, piece, target, offset),
    }
}

/// Plain boolean form of [`classify`]; corrupted state reads as illegal.
pub fn is_legal(board: &Board, id: PieceId, target: Coord) -> bool {
    matches!(classify(board, id, target), Ok(Some(_)))
}

/// Every square the piece may legally move to.
pub fn legal_destinations(board: &Board, id: PieceId) -> Result<Vec<Coord>, ChessError> {
    board.piece_checked(id)?;
    let mut out = Vec::new();
    for rank in 0..8 {
        for file in 0..8 {
            let coord = Coord::new(file, rank);
            if classify(board, id, coord)?.is_some() {
                out.push(coord);
            }
        }
    }
    Ok(out)
}

/// Does the side to move have any legal move at all?
pub fn side_has_moves(board: &Board) -> Result<bool, ChessError> {
    let movers: Vec<PieceId> = board
        .live_pieces()
        .filter(|p| p.team == board.turn)
        .map(|p| p.id)
        .collect();
    for id in movers {
        for rank in 0..8 {
            for file in 0..8 {
                if classify(board, id, Coord::new(file, rank))?.is_some() {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

/// Is the given team's king currently attacked?
pub fn in_check(board: &Board, team: Team) -> Result<bool, ChessError> {
    let king_coord = board.king(team)?.coord;
    Ok(square_attacked(board, king_coord, team.opponent()))
}

// -------------------------------------------------------------------------
// Kind dispatch
// -------------------------------------------------------------------------

fn classify_quiet(
    board: &Board,
    piece: &Piece,
    target: Coord,
    offset: Offset,
    double_step: bool,
) -> Result<Option<LegalMove>, ChessError> {
    if board.square(target).occupant.is_some() {
        return Ok(None);
    }
    if !ray_clear(&blockers(board, piece), offset) {
        return Ok(None);
    }
    if exposes_own_king(board, piece, target, None)? {
        return Ok(None);
    }
    let kind = if double_step {
        MoveKind::Initial
    } else {
        MoveKind::Quiet
    };
    Ok(Some(LegalMove {
        double_step,
        ..LegalMove::plain(kind, None)
    }))
}

fn classify_capture(
    board: &Board,
    piece: &Piece,
    target: Coord,
    offset: Offset,
) -> Result<Option<LegalMove>, ChessError> {
    if let Some(occupant) = board.piece_at(target) {
        if occupant.team == piece.team {
            return Ok(None);
        }
        let victim = occupant.id;
        if !ray_clear(&blockers(board, piece), offset) {
            return Ok(None);
        }
        if exposes_own_king(board, piece, target, Some(victim))? {
            return Ok(None);
        }
        return Ok(Some(LegalMove::plain(MoveKind::Capture, Some(victim))));
    }

    // Empty destination: only the en-passant special case can qualify.
    classify_en_passant(board, piece, target)
}

fn classify_slide(
    board: &Board,
    piece: &Piece,
    target: Coord,
    offset: Offset,
    kind: MoveKind,
) -> Result<Option<LegalMove>, ChessError> {
    let victim = match board.piece_at(target) {
        Some(occupant) if occupant.team == piece.team => return Ok(None),
        Some(occupant) => Some(occupant.id),
        None => None,
    };
    if kind != MoveKind::Jump && !ray_clear(&blockers(board, piece), offset) {
        return Ok(None);
    }
    if exposes_own_king(board, piece, target, victim)? {
        return Ok(None);
    }
    Ok(Some(LegalMove::plain(kind, victim)))
}

fn classify_initial(
    board: &Board,
    piece: &Piece,
    target: Coord,
    offset: Offset,
) -> Result<Option<LegalMove>, ChessError> {
    if piece.has_moved {
        return Ok(None);
    }
    match piece.kind {
        PieceKind::King => {
            let Some(castle) = check_castle(board, piece, target) else {
                return Ok(None);
            };
            let verdict = classify_quiet(board, piece, target, offset, false)?;
            Ok(verdict.map(|_| LegalMove {
                castle: Some(castle),
                ..LegalMove::plain(MoveKind::Initial, None)
            }))
        }
        // Pawn double step.
        _ => classify_quiet(board, piece, target, offset, true),
    }
}

fn classify_en_passant(
    board: &Board,
    piece: &Piece,
    target: Coord,
) -> Result<Option<LegalMove>, ChessError> {
    if piece.kind != PieceKind::Pawn || piece.coord.rank != piece.team.en_passant_rank() {
        return Ok(None);
    }
    // The captured pawn sits one rank behind the destination.
    let Some(victim_coord) = target.step(Offset::new(0, -1), piece.team) else {
        return Ok(None);
    };
    let victim = board
        .piece_at(victim_coord)
        .filter(|p| {
            p.kind == PieceKind::Pawn && p.team != piece.team && p.en_passant_vulnerable
        })
        .map(|p| p.id);
    let Some(victim) = victim else {
        return Ok(None);
    };
    if exposes_own_king(board, piece, target, Some(victim))? {
        return Ok(None);
    }
    Ok(Some(LegalMove {
        en_passant: true,
        ..LegalMove::plain(MoveKind::Capture, Some(victim))
    }))
}

// -------------------------------------------------------------------------
// Obstruction
// -------------------------------------------------------------------------

/// Occupied offsets among the piece's own geometric steps. Recomputed per
/// query from current occupancy; knight jumps are exempt.
fn blockers(board: &Board, piece: &Piece) -> Vec<Offset> {
    let mut found = Vec::new();
    for rule in moves::tables().rules(piece.kind) {
        if rule.kind == MoveKind::Jump {
            continue;
        }
        if let Some(coord) = piece.coord.step(rule.offset, piece.team)
            && board.square(coord).occupant.is_some()
        {
            found.push(rule.offset);
        }
    }
    found
}

/// No occupied square may lie strictly between the origin and `offset`
/// along the same ray. The destination itself does not block.
fn ray_clear(blockers: &[Offset], offset: Offset) -> bool {
    let direction = offset.direction();
    !blockers
        .iter()
        .any(|b| b.direction() == direction && b.magnitude() < offset.magnitude())
}

// -------------------------------------------------------------------------
// Attack detection
// -------------------------------------------------------------------------

/// Is `target` attacked by any piece of `by`? A square counts as attacked
/// when a piece could capture on it: `Quiet`/`Initial` steps never attack.
pub fn square_attacked(board: &Board, target: Coord, by: Team) -> bool {
    board
        .live_pieces()
        .filter(|p| p.team == by)
        .any(|p| attacks_square(board, p, target))
}

fn attacks_square(board: &Board, piece: &Piece, target: Coord) -> bool {
    let offset = piece.coord.offset_to(target, piece.team);
    let Some(rule) = find_rule(piece.kind, offset) else {
        return false;
    };
    match rule.kind {
        MoveKind::Quiet | MoveKind::Initial => false,
        MoveKind::Jump | MoveKind::Capture => true,
        MoveKind::Slide => ray_clear(&blockers(board, piece), offset),
    }
}

// -------------------------------------------------------------------------
// Self-check filter
// -------------------------------------------------------------------------

/// Would this move leave the mover's own king attacked? Evaluated on a
/// scratch copy: lift the victim (including the en-passant pawn, so a
/// discovered check through its square is seen), relocate the mover, and
/// run the attack test against the king.
fn exposes_own_king(
    board: &Board,
    piece: &Piece,
    target: Coord,
    victim: Option<PieceId>,
) -> Result<bool, ChessError> {
    let mut scratch = board.clone();
    if let Some(victim) = victim {
        scratch.lift_piece(victim);
    }
    scratch.relocate(piece.id, target);
    let king_coord = scratch.king(piece.team)?.coord;
    Ok(square_attacked(&scratch, king_coord, piece.team.opponent()))
}

// -------------------------------------------------------------------------
// Castling
// -------------------------------------------------------------------------

/// Castling-specific legality: the target file names the rook (6 =
/// kingside, 2 = queenside), which must exist, be alive, and be unmoved;
/// every square strictly between king and rook must be empty; and no
/// square from the king (inclusive — castling out of check is forbidden)
/// up to the rook (exclusive) may be attacked.
fn check_castle(board: &Board, king: &Piece, target: Coord) -> Option<CastleMove> {
    let side = match target.file {
        6 => CastleSide::Kingside,
        2 => CastleSide::Queenside,
        _ => return None,
    };
    let slot = match side {
        CastleSide::Kingside => KINGSIDE,
        CastleSide::Queenside => QUEENSIDE,
    };
    let rook_id = king.castling_rooks[slot]?;
    let rook = board.piece(rook_id)?;
    if rook.has_moved {
        return None;
    }

    let rank = king.coord.rank;
    let (lo, hi) = if king.coord.file < rook.coord.file {
        (king.coord.file, rook.coord.file)
    } else {
        (rook.coord.file, king.coord.file)
    };
    for file in lo + 1..hi {
        if board.square(Coord::new(file, rank)).occupant.is_some() {
            return None;
        }
    }

    let direction = (rook.coord.file - king.coord.file).signum();
    let mut file = king.coord.file;
    while file != rook.coord.file {
        if square_attacked(board, Coord::new(file, rank), king.team.opponent()) {
            return None;
        }
        file += direction;
    }

    Some(CastleMove {
        side,
        rook: rook_id,
    })
}

// =========================================================================
// Commit
// =========================================================================

/// Apply a move the caller just classified as legal. Effects, in order:
/// resolve the capture, relocate the mover, relocate the castling rook,
/// set or clear the en-passant window, mark the mover as moved. Notation
/// recording and the turn change are the game controller's job.
pub fn commit(
    board: &mut Board,
    id: PieceId,
    target: Coord,
    verdict: &LegalMove,
) -> Result<(), ChessError> {
    let mover = board.piece_checked(id)?;
    let team = mover.team;
    let from = mover.coord;

    if let Some(victim) = verdict.victim {
        board.lift_piece(victim);
    }
    board.relocate(id, target);

    if let Some(castle) = verdict.castle {
        let rook_file = match castle.side {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        };
        board.relocate(castle.rook, Coord::new(rook_file, target.rank));
        if let Some(rook) = board.piece_mut(castle.rook) {
            rook.has_moved = true;
        }
    }

    if verdict.double_step {
        board.en_passant_target = target.step(Offset::new(0, -1), team);
        if let Some(pawn) = board.piece_mut(id) {
            pawn.en_passant_vulnerable = true;
        }
    } else {
        board.en_passant_target = None;
    }

    if let Some(mover) = board.piece_mut(id) {
        mover.has_moved = true;
    }

    tracing::debug!(
        team = %team,
        from = %from,
        to = %target,
        capture = verdict.is_capture(),
        "move committed"
    );
    Ok(())
}

// -------------------------------------------------------------------------
// Internal helpers
// -------------------------------------------------------------------------

fn find_rule(kind: PieceKind, offset: Offset) -> Option<&'static MoveRule> {
    moves::tables()
        .rules(kind)
        .iter()
        .find(|r| r.offset == offset)
}

// =========================================================================
// Tests
// =========================================================================
