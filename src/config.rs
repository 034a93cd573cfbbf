//! Game-session configuration.
//!
//! One `GameConfig` is built up front (from environment variables or by the
//! embedding application) and passed into game construction — there is no
//! ambient settings store consulted mid-game. Theme and piece-set are
//! carried for the presentation layer; the engine itself only reads
//! `initial_fen`.

/// Configuration for one game session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Position to start from; `None` means the standard starting position.
    pub initial_fen: Option<String>,
    /// Board theme name, passed through to the presentation layer.
    pub theme: String,
    /// Piece-set name, passed through to the presentation layer.
    pub piece_set: String,
}

impl GameConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        GameConfig {
            initial_fen: std::env::var("CHESS_INITIAL_FEN")
                .ok()
                .filter(|v| !v.is_empty()),
            theme: std::env::var("CHESS_THEME").unwrap_or_else(|_| "classic".to_string()),
            piece_set: std::env::var("CHESS_PIECE_SET").unwrap_or_else(|_| "standard".to_string()),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            initial_fen: None,
            theme: "classic".to_string(),
            piece_set: "standard".to_string(),
        }
    }
}
