//! Interfaces to the world outside the rules.
//!
//! A [`Game`](crate::Game) never draws or stores anything itself. Hosts plug
//! in a [`BoardRenderer`] to show the board and a [`ResultRecorder`] to keep
//! finished results. [`TextRenderer`] and [`Standings`] are simple
//! implementations of each.

use chess_core::{Color, Square};
use std::collections::HashMap;
use std::convert::Infallible;
use std::io::{self, Write};
use thiserror::Error;

use crate::{Board, Outcome, SquareSet};

/// Draws a board. Receives read-only access only.
pub trait BoardRenderer {
    type Error;

    /// Draws `board`, marking the squares in `highlights`.
    fn render(&mut self, board: &Board, highlights: SquareSet) -> Result<(), Self::Error>;
}

/// Writes an ASCII diagram, rank 8 at the top.
///
/// Highlighted squares are prefixed with `*`.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BoardRenderer for TextRenderer<W> {
    type Error = io::Error;

    fn render(&mut self, board: &Board, highlights: SquareSet) -> io::Result<()> {
        for rank in (0..8u8).rev() {
            write!(self.out, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let Some(sq) = Square::from_coords(file, rank) else {
                    continue;
                };
                let mark = if highlights.contains(sq) { '*' } else { ' ' };
                let code = board.piece_at(sq).map_or('.', |p| p.code());
                write!(self.out, "{}{}", mark, code)?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, "   a b c d e f g h")?;
        self.out.flush()
    }
}

/// Names of the two players of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Players {
    pub white: String,
    pub black: String,
}

impl Players {
    pub fn new(white: impl Into<String>, black: impl Into<String>) -> Self {
        Players {
            white: white.into(),
            black: black.into(),
        }
    }

    pub fn name(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

/// Stores finished results.
pub trait ResultRecorder {
    type Error;

    fn record(&mut self, players: &Players, outcome: Outcome) -> Result<(), Self::Error>;
}

/// Error from [`Game::report`](crate::Game::report).
#[derive(Debug, Error)]
pub enum ReportError<E: std::error::Error + 'static> {
    #[error("game is still in progress")]
    NotFinished,
    #[error("failed to record result")]
    Recorder(#[source] E),
}

/// Win, loss and draw counts for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub games: u32,
}

/// In-memory tally of results per player.
#[derive(Debug, Clone, Default)]
pub struct Standings {
    records: HashMap<String, Record>,
}

impl Standings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record of `player`, all zeros if they never played.
    pub fn get(&self, player: &str) -> Record {
        self.records.get(player).copied().unwrap_or_default()
    }

    fn entry(&mut self, player: &str) -> &mut Record {
        let record = self.records.entry(player.to_string()).or_default();
        record.games += 1;
        record
    }
}

impl ResultRecorder for Standings {
    type Error = Infallible;

    fn record(&mut self, players: &Players, outcome: Outcome) -> Result<(), Infallible> {
        match outcome.winner() {
            Some(winner) => {
                self.entry(players.name(winner)).wins += 1;
                self.entry(players.name(winner.opposite())).losses += 1;
            }
            None => {
                self.entry(&players.white).draws += 1;
                self.entry(&players.black).draws += 1;
            }
        }
        Ok(())
    }
}
