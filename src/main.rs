//! Minimal terminal driver for the rules engine.
//!
//! Reads moves from stdin — coordinate pairs (`e2e4`) or SAN (`Nf3`,
//! `O-O`, `e8=Q`) — applies them through the public API, and prints the
//! board, the recorded notation, and any game-end verdict. All real
//! presentation (rendering, audio, menus) belongs to embedding
//! applications; this exists to exercise the engine end to end.

use std::io::{self, BufRead, Write};

use chess_rules::config::GameConfig;
use chess_rules::engine::{ChessError, Coord, Game, GameEvent, MoveReport, PieceKind};

fn main() {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rules=info".into()),
        )
        .init();

    let config = GameConfig::from_env();
    let mut game = match Game::with_config(&config) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("invalid starting position: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "chess-rules v{} (theme: {}, pieces: {})",
        env!("CARGO_PKG_VERSION"),
        config.theme,
        config.piece_set
    );
    println!("{}", game.board());
    println!("enter moves as 'e2e4' or SAN ('Nf3', 'O-O'); 'fen', 'moves', 'quit'");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let input = line.trim();

        match input {
            "" => {}
            "quit" | "exit" => break,
            "fen" => println!("{}", game.to_fen()),
            "moves" => println!("{}", game.move_list().join(" ")),
            _ => {
                if game.promotion_pending() {
                    handle_promotion(&mut game, input);
                } else {
                    handle_move(&mut game, input);
                }
            }
        }

        if let Some(end) = game.game_end() {
            println!("game over: {} ({})", end.verdict, end.side);
        } else if !game.promotion_pending() {
            prompt(&game);
        }
    }
}

fn prompt(game: &Game) {
    print!("{} to move > ", game.side_to_move());
    io::stdout().flush().ok();
}

fn handle_move(game: &mut Game, input: &str) {
    let result = if input.len() == 4 && input.is_char_boundary(2) {
        propose_by_coords(game, input)
    } else {
        game.play_san(input)
    };

    match result {
        Ok(report) => {
            print_report(game, &report);
            if report.promotion_pending {
                print!("promote to (Q/R/B/N) > ");
                io::stdout().flush().ok();
            }
        }
        Err(err) => println!("rejected: {err}"),
    }
}

fn propose_by_coords(game: &mut Game, input: &str) -> Result<MoveReport, ChessError> {
    let from = Coord::from_algebraic(&input[..2])?;
    let to = Coord::from_algebraic(&input[2..])?;
    let piece = game
        .piece_at(from)
        .ok_or_else(|| ChessError::IllegalMove {
            from: from.to_algebraic(),
            to: to.to_algebraic(),
            reason: "no piece on that square".to_string(),
        })?
        .id;
    game.propose_move(piece, to)
}

fn handle_promotion(game: &mut Game, input: &str) {
    let kind = match input.to_ascii_uppercase().as_str() {
        "Q" => PieceKind::Queen,
        "R" => PieceKind::Rook,
        "B" => PieceKind::Bishop,
        "N" => PieceKind::Knight,
        other => {
            println!("rejected: invalid promotion piece: {other}");
            return;
        }
    };
    match game.choose_promotion(kind) {
        Ok(report) => print_report(game, &report),
        Err(err) => println!("rejected: {err}"),
    }
}

fn print_report(game: &Game, report: &MoveReport) {
    if report.event == GameEvent::CaptureCompleted {
        println!("capture!");
    }
    if let Some(san) = &report.san {
        println!("played {san}");
    }
    println!("{}", game.board());
}
