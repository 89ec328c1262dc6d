//! Chess rules engine.
//!
//! This crate provides:
//! - [`Board`] - 8×8 mailbox grid with reversible move application
//! - [`Position`] - board plus turn, castling rights, last move and clock
//! - [`Game`] - legality checks, move execution, history and outcomes
//! - [`RulesConfig`] - castling strictness, repetition keys and history scope
//! - Move generation in three layers: attacks, pseudo-legal, legal
//! - Save-record restore and serialization
//!
//! # Architecture
//!
//! Check detection uses only attack sets, never the legality filter. The
//! legality filter tries every candidate on a scratch copy of the board
//! through [`Board::with_applied`], which applies the move, evaluates a
//! closure and reverts it again.
//!
//! # Example
//!
//! ```
//! use chess_rules::{Game, Outcome};
//!
//! let mut game = Game::new();
//! for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     game.make_move_uci(uci).unwrap();
//! }
//! assert!(matches!(game.outcome(), Outcome::Checkmate { .. }));
//! println!("Saved: {}", game.to_save());
//! ```

mod board;
pub mod collaborators;
mod config;
mod game;
pub mod movegen;
mod outcome;
mod position;
mod square_set;

pub use board::{Board, Undo};
pub use collaborators::{
    BoardRenderer, Players, ReportError, ResultRecorder, Standings, TextRenderer,
};
pub use config::{CastlingCheck, ConfigError, HistoryScope, RepetitionKey, RulesConfig};
pub use game::{Game, GameError};
pub use movegen::{is_in_check, is_square_attacked, legal_moves, legal_targets};
pub use outcome::{evaluate, DrawReason, Outcome};
pub use position::{CastleSide, CastlingRights, Played, Position, PositionError};
pub use square_set::SquareSet;
