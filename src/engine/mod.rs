pub mod board;
pub mod coord;
pub mod game;
pub mod moves;
pub mod piece;
pub mod rules;
pub mod san;
pub mod types;

pub use board::Board;
pub use coord::{Coord, Offset, SquareShade};
pub use game::{Game, MoveReport};
pub use piece::{Piece, PieceId};
pub use rules::{classify, is_legal, legal_destinations, square_attacked};
pub use types::*;
