//! Save-record parsing and serialization.
//!
//! A save record is a single line of `;`-separated fields:
//!
//! ```text
//! whiteKingside;whiteQueenside;blackKingside;blackQueenside;side;halfmoves;board
//! ```
//!
//! The board is eight ranks from rank 8 down to rank 1 separated by `/`,
//! each rank eight characters from file a to h: a piece code
//! (`PNBRQK` for White, `pnbrqk` for Black) or [`EMPTY`] for a vacant cell.

use crate::Color;
use thiserror::Error;

/// Character used for an empty cell.
pub const EMPTY: char = '.';

/// Field delimiter.
pub const DELIMITER: char = ';';

/// Rank separator inside the board field.
pub const RANK_SEPARATOR: char = '/';

const FIELD_COUNT: usize = 7;

/// Errors that can occur when decoding a save record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid save record: expected 7 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid castling flag: expected 'true' or 'false', got '{0}'")]
    CastlingFlag(String),

    #[error("invalid side to move: expected 'white' or 'black', got '{0}'")]
    SideToMove(String),

    #[error("invalid halfmove clock: {0}")]
    HalfmoveClock(String),

    #[error("invalid board: {0}")]
    Board(String),
}

/// Castling flags in save-record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingFlags {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

/// Parsed save-record fields.
///
/// The record is only checked for shape here. Turning the placement into a
/// playable board, and rejecting boards no game could reach, is the
/// engine's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecord {
    pub castling: CastlingFlags,
    pub side_to_move: Color,
    pub halfmove_clock: u32,
    /// Board field exactly as written, rank 8 first.
    pub placement: String,
}

impl SaveRecord {
    /// Board field of the standard starting position.
    pub const START_PLACEMENT: &'static str =
        "rnbqkbnr/pppppppp/......../......../......../......../PPPPPPPP/RNBQKBNR";

    /// Parses a save record.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let fields: Vec<&str> = text.trim().split(DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(DecodeError::FieldCount(fields.len()));
        }

        let castling = CastlingFlags {
            white_kingside: parse_flag(fields[0])?,
            white_queenside: parse_flag(fields[1])?,
            black_kingside: parse_flag(fields[2])?,
            black_queenside: parse_flag(fields[3])?,
        };

        let side_to_move = Color::from_token(fields[4])
            .ok_or_else(|| DecodeError::SideToMove(fields[4].to_string()))?;

        let halfmove_clock = fields[5]
            .parse::<u32>()
            .map_err(|_| DecodeError::HalfmoveClock(fields[5].to_string()))?;

        Self::validate_placement(fields[6])?;

        Ok(SaveRecord {
            castling,
            side_to_move,
            halfmove_clock,
            placement: fields[6].to_string(),
        })
    }

    /// Checks that a board field has eight ranks of eight known cells.
    pub fn validate_placement(placement: &str) -> Result<(), DecodeError> {
        let ranks: Vec<&str> = placement.split(RANK_SEPARATOR).collect();
        if ranks.len() != 8 {
            return Err(DecodeError::Board(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (i, rank) in ranks.iter().enumerate() {
            let mut cells = 0;
            for c in rank.chars() {
                if c != EMPTY && !"pnbrqkPNBRQK".contains(c) {
                    return Err(DecodeError::Board(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )));
                }
                cells += 1;
            }
            if cells != 8 {
                return Err(DecodeError::Board(format!(
                    "rank {} has {} cells, expected 8",
                    8 - i,
                    cells
                )));
            }
        }

        Ok(())
    }

    /// Iterates over the placement as `(file, rank, code)` for every
    /// occupied cell. Cells beyond the eighth rank or file are skipped, so
    /// run [`SaveRecord::validate_placement`] first on hand-built records.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (u8, u8, char)> + '_ {
        self.placement
            .split(RANK_SEPARATOR)
            .enumerate()
            .filter_map(|(row, cells)| {
                let rank = u8::try_from(row).ok().and_then(|r| 7u8.checked_sub(r))?;
                Some((rank, cells))
            })
            .flat_map(|(rank, cells)| {
                cells
                    .chars()
                    .enumerate()
                    .filter(|&(file, c)| file < 8 && c != EMPTY)
                    .map(move |(file, c)| (file as u8, rank, c))
            })
    }

    /// Converts the record back to its text form.
    pub fn to_text(&self) -> String {
        format!(
            "{};{};{};{};{};{};{}",
            self.castling.white_kingside,
            self.castling.white_queenside,
            self.castling.black_kingside,
            self.castling.black_queenside,
            self.side_to_move.token(),
            self.halfmove_clock,
            self.placement
        )
    }
}

fn parse_flag(token: &str) -> Result<bool, DecodeError> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DecodeError::CastlingFlag(other.to_string())),
    }
}
