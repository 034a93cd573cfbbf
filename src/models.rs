//! Serialization-facing data transfer models.
//!
//! The engine types stay plain; everything that crosses the boundary to a
//! UI, a save file, or an external tool is mirrored here with serde
//! derives and camelCase field names.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A persisted game: current FEN plus the ordered move and position
/// histories — sufficient to fully reconstruct the board state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub fen: String,
    pub starting_fen: String,
    /// SAN strings in play order.
    pub moves: Vec<String>,
    /// FEN of every position reached, in order.
    pub position_history: Vec<String>,
}

// ---------------------------------------------------------------------------
// UI state view
// ---------------------------------------------------------------------------

/// Snapshot of the visible game state for UI consumption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub fen: String,
    /// 8×8 array, rank 8 first; empty squares are empty strings, pieces
    /// are like `"wP"` and `"bK"`.
    pub board: [[String; 8]; 8],
    pub turn: String,
    pub status: String,
    pub moves: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_end: Option<GameEndNotice>,
}

/// Terminal notification: how the game ended and for which side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEndNotice {
    /// One of `checkmate`, `stalemate`, `threefold_repetition`,
    /// `fifty_move_rule`, `insufficient_material`.
    pub verdict: String,
    /// The losing (checkmate) or drawing side — always the side to move.
    pub side: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
