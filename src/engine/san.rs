//! Standard Algebraic Notation (SAN) recording and parsing.
//!
//! Recording examples: `e4`, `Nf3`, `Bxe5`, `exd6`, `O-O`, `Raxd1`. The
//! `+`/`#` suffixes and the `=<Letter>` promotion suffix are appended by
//! the game controller once the post-move status (or the chosen promotion
//! kind) is known.

use crate::engine::board::Board;
use crate::engine::coord::Coord;
use crate::engine::piece::PieceId;
use crate::engine::rules::{self, CastleSide, LegalMove};
use crate::engine::types::{ChessError, PieceKind};

// =========================================================================
// Recording
// =========================================================================

/// Render a just-classified move as SAN. Must be called before the move is
/// committed — disambiguation inspects the pre-move board.
pub fn record(
    board: &Board,
    id: PieceId,
    target: Coord,
    verdict: &LegalMove,
) -> Result<String, ChessError> {
    if let Some(castle) = verdict.castle {
        return Ok(match castle.side {
            CastleSide::Kingside => "O-O".to_string(),
            CastleSide::Queenside => "O-O-O".to_string(),
        });
    }

    let piece = board.piece_checked(id)?;
    let mut san = String::with_capacity(8);

    if piece.kind == PieceKind::Pawn {
        // Pawn captures carry the departure file: "exd5".
        if verdict.is_capture() {
            san.push(piece.coord.file_char());
            san.push('x');
        }
        san.push_str(&target.to_algebraic());
    } else {
        san.push(piece.kind.san_letter());
        san.push_str(&disambiguation(board, id, target));
        if verdict.is_capture() {
            san.push('x');
        }
        san.push_str(&target.to_algebraic());
    }

    Ok(san)
}

/// Disambiguation for a piece move: when other like pieces of the mover's
/// team could also legally reach the destination, add file, then rank,
/// then both, as needed.
fn disambiguation(board: &Board, id: PieceId, target: Coord) -> String {
    let Some(mover) = board.piece(id) else {
        return String::new();
    };

    let rivals: Vec<Coord> = board
        .live_pieces()
        .filter(|p| {
            p.id != id
                && p.team == mover.team
                && p.kind == mover.kind
                && rules::is_legal(board, p.id, target)
        })
        .map(|p| p.coord)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|c| c.file == mover.coord.file);
    let shares_rank = rivals.iter().any(|c| c.rank == mover.coord.rank);

    match (shares_file, shares_rank) {
        // File alone is sufficient.
        (false, _) => mover.coord.file_char().to_string(),
        // Rank alone is sufficient.
        (true, false) => mover.coord.rank_char().to_string(),
        // Need both.
        (true, true) => mover.coord.to_algebraic(),
    }
}

// =========================================================================
// Parsing
// =========================================================================

/// A SAN string resolved against the current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedMove {
    pub piece: PieceId,
    pub target: Coord,
    pub promotion: Option<PieceKind>,
}

/// Parse standard SAN (`e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q`, …) into the
/// unique matching legal move for the side to move. Check and annotation
/// suffixes (`+`, `#`, `!`, `?`) are ignored.
pub fn parse(board: &Board, san: &str) -> Result<ParsedMove, ChessError> {
    let trimmed = san.trim_end_matches(['+', '#', '!', '?']);

    // Castling.
    if trimmed == "O-O" || trimmed == "0-0" {
        return parse_castling(board, CastleSide::Kingside, san);
    }
    if trimmed == "O-O-O" || trimmed == "0-0-0" {
        return parse_castling(board, CastleSide::Queenside, san);
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.is_empty() {
        return Err(illegal(san, "empty SAN string"));
    }

    // Promotion suffix.
    let (chars, promotion) = if chars.len() >= 2 && chars[chars.len() - 2] == '=' {
        let promo_char = chars[chars.len() - 1];
        let promo = match promo_char.to_ascii_uppercase() {
            'Q' => PieceKind::Queen,
            'R' => PieceKind::Rook,
            'B' => PieceKind::Bishop,
            'N' => PieceKind::Knight,
            _ => return Err(ChessError::InvalidPromotion(promo_char.to_string())),
        };
        (&chars[..chars.len() - 2], Some(promo))
    } else {
        (&chars[..], None)
    };

    // Leading piece letter (pawn moves have none).
    let (kind, rest) = match chars.first() {
        Some('N') => (PieceKind::Knight, &chars[1..]),
        Some('B') => (PieceKind::Bishop, &chars[1..]),
        Some('R') => (PieceKind::Rook, &chars[1..]),
        Some('Q') => (PieceKind::Queen, &chars[1..]),
        Some('K') => (PieceKind::King, &chars[1..]),
        _ => (PieceKind::Pawn, chars),
    };

    // Strip the capture marker.
    let rest: Vec<char> = rest.iter().copied().filter(|&c| c != 'x').collect();
    if rest.len() < 2 {
        return Err(illegal(san, "SAN too short"));
    }

    let dest_str: String = rest[rest.len() - 2..].iter().collect();
    let target = Coord::from_algebraic(&dest_str)?;

    // Disambiguation characters before the destination.
    let disambig = &rest[..rest.len() - 2];
    let want_file: Option<i8> = disambig
        .iter()
        .find(|c| c.is_ascii_lowercase())
        .map(|&c| c as i8 - 'a' as i8);
    let want_rank: Option<i8> = disambig
        .iter()
        .find(|c| c.is_ascii_digit())
        .map(|&c| c as i8 - '1' as i8);

    let candidates: Vec<PieceId> = board
        .live_pieces()
        .filter(|p| {
            p.team == board.turn
                && p.kind == kind
                && want_file.is_none_or(|f| p.coord.file == f)
                && want_rank.is_none_or(|r| p.coord.rank == r)
                && rules::is_legal(board, p.id, target)
        })
        .map(|p| p.id)
        .collect();

    match candidates.len() {
        0 => Err(illegal(san, "no legal move matches")),
        1 => Ok(ParsedMove {
            piece: candidates[0],
            target,
            promotion,
        }),
        n => Err(illegal(san, &format!("ambiguous: {n} candidates"))),
    }
}

fn parse_castling(
    board: &Board,
    side: CastleSide,
    san: &str,
) -> Result<ParsedMove, ChessError> {
    let king = board.king(board.turn)?;
    let file = match side {
        CastleSide::Kingside => 6,
        CastleSide::Queenside => 2,
    };
    let target = Coord::new(file, king.coord.rank);
    if !rules::is_legal(board, king.id, target) {
        return Err(illegal(san, "castling not legal here"));
    }
    Ok(ParsedMove {
        piece: king.id,
        target,
        promotion: None,
    })
}

fn illegal(san: &str, reason: &str) -> ChessError {
    ChessError::IllegalMove {
        from: String::new(),
        to: san.to_string(),
        reason: reason.to_string(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::classify;

    fn sq(name: &str) -> Coord {
        Coord::from_algebraic(name).unwrap()
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    fn san_for(b: &Board, from: &str, to: &str) -> String {
        let id = b.piece_at(sq(from)).unwrap().id;
        let verdict = classify(b, id, sq(to)).unwrap().expect("move must be legal");
        record(b, id, sq(to), &verdict).unwrap()
    }

    // -------------------------------------------------------------------
    // Recording: pawns
    // -------------------------------------------------------------------

    #[test]
    fn record_pawn_push() {
        let b = Board::starting();
        assert_eq!(san_for(&b, "e2", "e4"), "e4");
    }

    #[test]
    fn record_pawn_capture() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        assert_eq!(san_for(&b, "e4", "d5"), "exd5");
    }

    #[test]
    fn record_en_passant_capture() {
        let b = board("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(san_for(&b, "e5", "f6"), "exf6");
    }

    // -------------------------------------------------------------------
    // Recording: pieces
    // -------------------------------------------------------------------

    #[test]
    fn record_knight_move() {
        let b = Board::starting();
        assert_eq!(san_for(&b, "g1", "f3"), "Nf3");
    }

    #[test]
    fn record_bishop_capture() {
        let b = board("rnbqk1nr/pppp1ppp/4p3/8/1b6/2N5/PPPPPPPP/R1BQKBNR b KQkq - 2 2");
        assert_eq!(san_for(&b, "b4", "c3"), "Bxc3");
    }

    // -------------------------------------------------------------------
    // Recording: castling
    // -------------------------------------------------------------------

    #[test]
    fn record_castling() {
        let b = board("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(san_for(&b, "e1", "g1"), "O-O");
        assert_eq!(san_for(&b, "e1", "c1"), "O-O-O");
    }

    // -------------------------------------------------------------------
    // Recording: disambiguation
    // -------------------------------------------------------------------

    #[test]
    fn disambiguate_by_file() {
        // Rooks on a1 and h1 both reach e1.
        let b = board("4k3/8/8/8/8/4K3/8/R6R w - - 0 1");
        assert_eq!(san_for(&b, "a1", "e1"), "Rae1");
        assert_eq!(san_for(&b, "h1", "e1"), "Rhe1");
    }

    #[test]
    fn disambiguate_by_rank() {
        // Rooks on a1 and a8 both reach a4.
        let b = board("R3k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        assert_eq!(san_for(&b, "a1", "a4"), "R1a4");
        assert_eq!(san_for(&b, "a8", "a4"), "R8a4");
    }

    #[test]
    fn disambiguate_by_both() {
        // Queens on a1, a3 and c1 all reach b2: one rival shares the a1
        // queen's file and another its rank, so it needs both.
        let b = board("4k3/8/8/8/8/Q7/8/Q1Q1K3 w - - 0 1");
        assert_eq!(san_for(&b, "a1", "b2"), "Qa1b2");
    }

    #[test]
    fn no_disambiguation_when_unique() {
        let b = Board::starting();
        assert_eq!(san_for(&b, "b1", "c3"), "Nc3");
    }

    // -------------------------------------------------------------------
    // Parsing
    // -------------------------------------------------------------------

    #[test]
    fn parse_pawn_push() {
        let b = Board::starting();
        let parsed = parse(&b, "e4").unwrap();
        assert_eq!(b.piece(parsed.piece).unwrap().coord, sq("e2"));
        assert_eq!(parsed.target, sq("e4"));
        assert_eq!(parsed.promotion, None);
    }

    #[test]
    fn parse_knight_move() {
        let b = Board::starting();
        let parsed = parse(&b, "Nf3").unwrap();
        assert_eq!(b.piece(parsed.piece).unwrap().coord, sq("g1"));
    }

    #[test]
    fn parse_capture_with_check_suffix() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let parsed = parse(&b, "exd5+").unwrap();
        assert_eq!(parsed.target, sq("d5"));
    }

    #[test]
    fn parse_castling_notation() {
        let b = board("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let kingside = parse(&b, "O-O").unwrap();
        assert_eq!(kingside.target, sq("g1"));
        let queenside = parse(&b, "O-O-O").unwrap();
        assert_eq!(queenside.target, sq("c1"));
    }

    #[test]
    fn parse_promotion() {
        let b = board("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let parsed = parse(&b, "e8=Q").unwrap();
        assert_eq!(parsed.target, sq("e8"));
        assert_eq!(parsed.promotion, Some(PieceKind::Queen));
    }

    #[test]
    fn parse_bad_promotion_letter() {
        let b = board("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        assert!(matches!(
            parse(&b, "e8=K"),
            Err(ChessError::InvalidPromotion(_))
        ));
    }

    #[test]
    fn parse_disambiguated_rook() {
        let b = board("4k3/8/8/8/8/4K3/8/R6R w - - 0 1");
        let parsed = parse(&b, "Rae1").unwrap();
        assert_eq!(b.piece(parsed.piece).unwrap().coord, sq("a1"));
    }

    #[test]
    fn parse_rejects_ambiguous() {
        let b = board("4k3/8/8/8/8/4K3/8/R6R w - - 0 1");
        assert!(parse(&b, "Re1").is_err());
    }

    #[test]
    fn parse_rejects_impossible() {
        let b = Board::starting();
        assert!(parse(&b, "Qh5").is_err());
        assert!(parse(&b, "O-O").is_err());
        assert!(parse(&b, "zz9").is_err());
    }

    // -------------------------------------------------------------------
    // Round trip: record then parse every legal move
    // -------------------------------------------------------------------

    #[test]
    fn san_round_trip_kiwipete() {
        let b = board("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let movers: Vec<PieceId> = b
            .live_pieces()
            .filter(|p| p.team == b.turn)
            .map(|p| p.id)
            .collect();
        for id in movers {
            for target in rules::legal_destinations(&b, id).unwrap() {
                let verdict = classify(&b, id, target).unwrap().unwrap();
                let san = record(&b, id, target, &verdict).unwrap();
                let parsed = parse(&b, &san)
                    .unwrap_or_else(|e| panic!("failed to re-parse {san:?}: {e}"));
                assert_eq!(parsed.piece, id, "piece mismatch for {san:?}");
                assert_eq!(parsed.target, target, "target mismatch for {san:?}");
            }
        }
    }
}
