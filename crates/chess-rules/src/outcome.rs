//! Game outcomes and the evaluator that decides them.

use chess_core::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::movegen::has_legal_move;
use crate::{Position, RulesConfig};

/// Halfmove clock at which a draw may be claimed.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Halfmove clock at which the game is drawn automatically.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Occurrences of one position that draw the game.
pub const REPETITION_LIMIT: usize = 3;

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// Claimed after 50 moves without a pawn move or capture.
    FiftyMoveRule,
    /// 75 moves without a pawn move or capture.
    SeventyFiveMoveRule,
    ThreefoldRepetition,
    Agreement,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrawReason::FiftyMoveRule => "fifty-move rule",
            DrawReason::SeventyFiveMoveRule => "seventy-five-move rule",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::Agreement => "agreement",
        };
        write!(f, "{}", s)
    }
}

/// The state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
}

impl Outcome {
    /// Returns true once no further moves may be played.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    pub const fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "in progress"),
            Outcome::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            Outcome::Stalemate => write!(f, "stalemate"),
            Outcome::Draw(reason) => write!(f, "draw by {}", reason),
        }
    }
}

/// Decides the outcome of `position`.
///
/// `history` holds the repetition keys counted so far, the current
/// position's included. Checks run in order: no legal moves (mate or
/// stalemate), the seventy-five-move rule, then threefold repetition.
pub fn evaluate(position: &Position, history: &[String], config: &RulesConfig) -> Outcome {
    let side = position.side_to_move;
    if !has_legal_move(position, side, config.castling) {
        return if position.is_check() {
            Outcome::Checkmate {
                winner: side.opposite(),
            }
        } else {
            Outcome::Stalemate
        };
    }

    if position.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
        return Outcome::Draw(DrawReason::SeventyFiveMoveRule);
    }

    let key = position.repetition_key(config.repetition_key);
    if history.iter().filter(|k| **k == key).count() >= REPETITION_LIMIT {
        return Outcome::Draw(DrawReason::ThreefoldRepetition);
    }

    Outcome::InProgress
}
