//! Fixed movement tables for each piece kind.
//!
//! Every kind owns a list of relative offsets, each tagged with the
//! conditions under which the step is playable. Offsets are written from
//! the mover's own perspective (`dy = +1` is forward), so one table serves
//! both teams. Built once via `OnceLock` and shared for the process
//! lifetime.

use std::sync::OnceLock;

use crate::engine::coord::Offset;
use crate::engine::types::PieceKind;

// =========================================================================
// MoveKind & MoveRule
// =========================================================================

/// What a movement-table entry permits at its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// Destination must be empty (pawn forward step).
    Quiet,
    /// Destination must hold an enemy piece, or the en-passant condition
    /// must hold (pawn diagonals).
    Capture,
    /// Destination may be empty or enemy-held; subject to obstruction
    /// (sliding rays, king ring).
    Slide,
    /// Like `Slide` but exempt from obstruction (knight).
    Jump,
    /// Playable only while the piece has never moved (pawn double step,
    /// king castling steps).
    Initial,
}

/// One entry of a piece kind's movement table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRule {
    pub offset: Offset,
    pub kind: MoveKind,
}

impl MoveRule {
    #[inline]
    const fn new(dx: i8, dy: i8, kind: MoveKind) -> Self {
        MoveRule {
            offset: Offset::new(dx, dy),
            kind,
        }
    }
}

// =========================================================================
// MoveTables
// =========================================================================

/// Get a reference to the global movement tables.
pub fn tables() -> &'static MoveTables {
    static TABLES: OnceLock<MoveTables> = OnceLock::new();
    TABLES.get_or_init(MoveTables::init)
}

/// The movement table of every piece kind.
pub struct MoveTables {
    pawn: Vec<MoveRule>,
    rook: Vec<MoveRule>,
    knight: Vec<MoveRule>,
    bishop: Vec<MoveRule>,
    queen: Vec<MoveRule>,
    king: Vec<MoveRule>,
}

impl MoveTables {
    /// The rules a piece of the given kind may attempt.
    #[inline]
    pub fn rules(&self, kind: PieceKind) -> &[MoveRule] {
        match kind {
            PieceKind::Pawn => &self.pawn,
            PieceKind::Rook => &self.rook,
            PieceKind::Knight => &self.knight,
            PieceKind::Bishop => &self.bishop,
            PieceKind::Queen => &self.queen,
            PieceKind::King => &self.king,
        }
    }

    fn init() -> Self {
        MoveTables {
            pawn: pawn_rules(),
            rook: straight_rules(),
            knight: knight_rules(),
            bishop: diagonal_rules(),
            queen: straight_rules().into_iter().chain(diagonal_rules()).collect(),
            king: king_rules(),
        }
    }
}

// -------------------------------------------------------------------------
// Table construction
// -------------------------------------------------------------------------

fn pawn_rules() -> Vec<MoveRule> {
    vec![
        MoveRule::new(0, 1, MoveKind::Quiet),
        MoveRule::new(0, 2, MoveKind::Initial),
        MoveRule::new(-1, 1, MoveKind::Capture),
        MoveRule::new(1, 1, MoveKind::Capture),
    ]
}

/// Rook rays, also half of the queen's table.
fn straight_rules() -> Vec<MoveRule> {
    let mut rules = Vec::with_capacity(28);
    for step in 1..8 {
        rules.push(MoveRule::new(step, 0, MoveKind::Slide));
        rules.push(MoveRule::new(-step, 0, MoveKind::Slide));
        rules.push(MoveRule::new(0, step, MoveKind::Slide));
        rules.push(MoveRule::new(0, -step, MoveKind::Slide));
    }
    rules
}

/// Bishop rays, also half of the queen's table.
fn diagonal_rules() -> Vec<MoveRule> {
    let mut rules = Vec::with_capacity(28);
    for step in 1..8 {
        rules.push(MoveRule::new(step, step, MoveKind::Slide));
        rules.push(MoveRule::new(-step, -step, MoveKind::Slide));
        rules.push(MoveRule::new(step, -step, MoveKind::Slide));
        rules.push(MoveRule::new(-step, step, MoveKind::Slide));
    }
    rules
}

fn knight_rules() -> Vec<MoveRule> {
    let mut rules = Vec::with_capacity(8);
    for dx in 1..3i8 {
        for dy in 1..3i8 {
            if dx != dy {
                rules.push(MoveRule::new(dx, dy, MoveKind::Jump));
                rules.push(MoveRule::new(-dx, -dy, MoveKind::Jump));
                rules.push(MoveRule::new(dx, -dy, MoveKind::Jump));
                rules.push(MoveRule::new(-dx, dy, MoveKind::Jump));
            }
        }
    }
    rules
}

/// The king ring plus the two castling steps.
fn king_rules() -> Vec<MoveRule> {
    let mut rules = vec![
        MoveRule::new(2, 0, MoveKind::Initial),
        MoveRule::new(-2, 0, MoveKind::Initial),
    ];
    for dx in -1..=1i8 {
        for dy in -1..=1i8 {
            if dx != 0 || dy != 0 {
                rules.push(MoveRule::new(dx, dy, MoveKind::Slide));
            }
        }
    }
    rules
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn find(kind: PieceKind, dx: i8, dy: i8) -> Option<MoveRule> {
        tables()
            .rules(kind)
            .iter()
            .copied()
            .find(|r| r.offset == Offset::new(dx, dy))
    }

    #[test]
    fn table_sizes() {
        let t = tables();
        assert_eq!(t.rules(PieceKind::Pawn).len(), 4);
        assert_eq!(t.rules(PieceKind::Rook).len(), 28);
        assert_eq!(t.rules(PieceKind::Bishop).len(), 28);
        assert_eq!(t.rules(PieceKind::Queen).len(), 56);
        assert_eq!(t.rules(PieceKind::Knight).len(), 8);
        assert_eq!(t.rules(PieceKind::King).len(), 10);
    }

    #[test]
    fn pawn_table() {
        assert_eq!(find(PieceKind::Pawn, 0, 1).unwrap().kind, MoveKind::Quiet);
        assert_eq!(find(PieceKind::Pawn, 0, 2).unwrap().kind, MoveKind::Initial);
        assert_eq!(find(PieceKind::Pawn, 1, 1).unwrap().kind, MoveKind::Capture);
        assert_eq!(find(PieceKind::Pawn, -1, 1).unwrap().kind, MoveKind::Capture);
        // Pawns never step backwards.
        assert!(find(PieceKind::Pawn, 0, -1).is_none());
    }

    #[test]
    fn knight_table_jumps() {
        for rule in tables().rules(PieceKind::Knight) {
            assert_eq!(rule.kind, MoveKind::Jump);
            let (dx, dy) = (rule.offset.dx.abs(), rule.offset.dy.abs());
            assert!((dx == 1 && dy == 2) || (dx == 2 && dy == 1));
        }
    }

    #[test]
    fn king_table_has_castling_steps() {
        assert_eq!(find(PieceKind::King, 2, 0).unwrap().kind, MoveKind::Initial);
        assert_eq!(find(PieceKind::King, -2, 0).unwrap().kind, MoveKind::Initial);
        assert_eq!(find(PieceKind::King, 1, 1).unwrap().kind, MoveKind::Slide);
        assert!(find(PieceKind::King, 3, 0).is_none());
    }

    #[test]
    fn slider_rays_reach_seven() {
        assert!(find(PieceKind::Rook, 7, 0).is_some());
        assert!(find(PieceKind::Bishop, -7, -7).is_some());
        assert!(find(PieceKind::Queen, 0, -7).is_some());
        assert!(find(PieceKind::Queen, 7, 7).is_some());
        // No rank/file mixing outside rays.
        assert!(find(PieceKind::Rook, 1, 1).is_none());
        assert!(find(PieceKind::Bishop, 1, 0).is_none());
    }

    #[test]
    fn rules_have_unique_offsets() {
        for kind in PieceKind::ALL {
            let rules = tables().rules(kind);
            for (i, a) in rules.iter().enumerate() {
                for b in &rules[i + 1..] {
                    assert_ne!(a.offset, b.offset, "duplicate offset in {kind} table");
                }
            }
        }
    }
}
