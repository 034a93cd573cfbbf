//! A chess rules engine.
//!
//! Given a board position and a proposed move, the engine decides legality,
//! applies the move, keeps the derived state current (turn, castling and
//! en-passant rights, move counters), and detects terminal conditions
//! (checkmate, stalemate, threefold repetition, the fifty-move rule, and
//! insufficient material). Full game state serializes to and from FEN, and
//! moves are recorded in standard algebraic notation.
//!
//! The main entry point is [`engine::Game`]:
//!
//! ```
//! use chess_rules::engine::{Coord, Game};
//!
//! let mut game = Game::new();
//! let pawn = game.piece_at(Coord::from_algebraic("e2")?).unwrap().id;
//! let report = game.propose_move(pawn, Coord::from_algebraic("e4")?)?;
//! assert_eq!(report.san.as_deref(), Some("e4"));
//! # Ok::<(), chess_rules::engine::ChessError>(())
//! ```
//!
//! Rendering, audio, persistence, and move search all live outside this
//! crate; they consume the engine through [`engine::Game`] and the DTOs in
//! [`models`].

pub mod config;
pub mod engine;
pub mod models;
