//! Chess position representation.

use chess_core::{CastlingFlags, Color, DecodeError, Move, Piece, PieceKind, SaveRecord, Square};
use std::fmt;
use thiserror::Error;

use crate::movegen::{self, en_passant_target};
use crate::{Board, RepetitionKey};

/// The two castling directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// File index of the rook's starting corner.
    pub const fn rook_file(self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    /// File index the king lands on.
    pub const fn king_target_file(self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// File index the rook lands on, which is also the square the king crosses.
    pub const fn rook_target_file(self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// Files that must be empty between king and rook.
    pub const fn between_files(self) -> &'static [u8] {
        match self {
            CastleSide::Kingside => &[5, 6],
            CastleSide::Queenside => &[1, 2, 3],
        }
    }

    /// Returns the side whose rook starts on `sq` for `color`, if any.
    fn from_corner(sq: Square, color: Color) -> Option<Self> {
        if sq.rank_index() != color.back_rank() {
            return None;
        }
        [CastleSide::Kingside, CastleSide::Queenside]
            .into_iter()
            .find(|side| side.rook_file() == sq.file_index())
    }
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const fn flag(color: Color, side: CastleSide) -> u8 {
        let shift = match side {
            CastleSide::Kingside => 0,
            CastleSide::Queenside => 1,
        };
        1 << (color.index() as u8 * 2 + shift)
    }

    /// Returns true if `color` may still castle toward `side`.
    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    #[inline]
    pub fn clear(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    /// Removes both rights of a color.
    #[inline]
    pub fn clear_color(&mut self, color: Color) {
        self.clear(color, CastleSide::Kingside);
        self.clear(color, CastleSide::Queenside);
    }

    fn set(&mut self, color: Color, side: CastleSide, on: bool) {
        if on {
            self.0 |= Self::flag(color, side);
        } else {
            self.clear(color, side);
        }
    }
}

impl From<CastlingFlags> for CastlingRights {
    fn from(flags: CastlingFlags) -> Self {
        let mut rights = CastlingRights::NONE;
        rights.set(Color::White, CastleSide::Kingside, flags.white_kingside);
        rights.set(Color::White, CastleSide::Queenside, flags.white_queenside);
        rights.set(Color::Black, CastleSide::Kingside, flags.black_kingside);
        rights.set(Color::Black, CastleSide::Queenside, flags.black_queenside);
        rights
    }
}

impl From<CastlingRights> for CastlingFlags {
    fn from(rights: CastlingRights) -> Self {
        CastlingFlags {
            white_kingside: rights.has(Color::White, CastleSide::Kingside),
            white_queenside: rights.has(Color::White, CastleSide::Queenside),
            black_kingside: rights.has(Color::Black, CastleSide::Kingside),
            black_queenside: rights.has(Color::Black, CastleSide::Queenside),
        }
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        for (color, side, c) in [
            (Color::White, CastleSide::Kingside, 'K'),
            (Color::White, CastleSide::Queenside, 'Q'),
            (Color::Black, CastleSide::Kingside, 'k'),
            (Color::Black, CastleSide::Queenside, 'q'),
        ] {
            if self.has(color, side) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// Errors that can occur when restoring a position from a save record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{color} must have exactly one king, found {count}")]
    KingCount { color: Color, count: usize },

    #[error("pawn on {0} cannot stand on the first or last rank")]
    PawnOnBackRank(Square),

    #[error("{color} {side:?} castling right requires king and rook on their starting squares")]
    CastlingWithoutPieces { color: Color, side: CastleSide },
}

/// What a move played through [`Position::play`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Played {
    pub mv: Move,
    /// The mover before it moved.
    pub moved: Piece,
    pub captured: Option<Piece>,
    /// Pawn move or capture; the halfmove clock restarted.
    pub irreversible: bool,
}

/// Complete chess position state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights.
    pub castling: CastlingRights,

    /// Source and destination of the previous move. En passant looks at it.
    pub last_move: Option<(Square, Square)>,

    /// Halfmoves since the last pawn move or capture.
    pub halfmove_clock: u32,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Position {
            board: Board::startpos(),
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            last_move: None,
            halfmove_clock: 0,
        }
    }

    /// Restores a position from save-record text.
    ///
    /// The previous move is not part of the record, so a restored position
    /// never offers an en passant capture.
    pub fn from_save(text: &str) -> Result<Self, PositionError> {
        let record = SaveRecord::parse(text)?;
        Self::from_record(&record)
    }

    /// Builds a position from a decoded record, rejecting boards no game
    /// could reach.
    ///
    /// The placement shape is checked here too, so hand-built records fail
    /// with [`DecodeError::Board`] like parsed ones.
    pub fn from_record(record: &SaveRecord) -> Result<Self, PositionError> {
        SaveRecord::validate_placement(&record.placement)?;
        let mut board = Board::empty();
        for (file, rank, code) in record.occupied_cells() {
            let (Some(sq), Some((kind, color))) =
                (Square::from_coords(file, rank), Piece::from_code(code))
            else {
                return Err(DecodeError::Board(format!("invalid cell '{}'", code)).into());
            };
            board.put(kind, color, sq);
        }

        for color in Color::BOTH {
            let count = board
                .pieces_of(color)
                .filter(|p| p.kind == PieceKind::King)
                .count();
            if count != 1 {
                return Err(PositionError::KingCount { color, count });
            }
        }

        if let Some(pawn) = board
            .pieces()
            .find(|p| p.kind == PieceKind::Pawn && matches!(p.square.rank_index(), 0 | 7))
        {
            return Err(PositionError::PawnOnBackRank(pawn.square));
        }

        let castling = CastlingRights::from(record.castling);
        for color in Color::BOTH {
            let rank = color.back_rank();
            for side in [CastleSide::Kingside, CastleSide::Queenside] {
                if !castling.has(color, side) {
                    continue;
                }
                let king_home = Square::from_coords(4, rank)
                    .is_some_and(|sq| board.holds(sq, PieceKind::King, color));
                let rook_home = Square::from_coords(side.rook_file(), rank)
                    .is_some_and(|sq| board.holds(sq, PieceKind::Rook, color));
                if !(king_home && rook_home) {
                    return Err(PositionError::CastlingWithoutPieces { color, side });
                }
            }
        }

        Ok(Position {
            board,
            side_to_move: record.side_to_move,
            castling,
            last_move: None,
            halfmove_clock: record.halfmove_clock,
        })
    }

    pub fn to_record(&self) -> SaveRecord {
        SaveRecord {
            castling: self.castling.into(),
            side_to_move: self.side_to_move,
            halfmove_clock: self.halfmove_clock,
            placement: self.board.placement(),
        }
    }

    /// Serializes the position as save-record text.
    pub fn to_save(&self) -> String {
        self.to_record().to_text()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        movegen::is_in_check(&self.board, self.side_to_move)
    }

    /// Square a pawn of the side to move could capture onto en passant.
    pub fn en_passant_square(&self) -> Option<Square> {
        self.board
            .pieces_of(self.side_to_move)
            .find_map(|pawn| en_passant_target(self, pawn))
    }

    /// Text identifying this position for repetition counting.
    pub fn repetition_key(&self, key: RepetitionKey) -> String {
        match key {
            RepetitionKey::Occupancy => self.board.placement(),
            RepetitionKey::Full => {
                let ep = self
                    .en_passant_square()
                    .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());
                format!(
                    "{};{};{};{}",
                    self.board.placement(),
                    self.side_to_move.token(),
                    self.castling,
                    ep
                )
            }
        }
    }

    /// Plays a move, updating the board, rights, clock and turn.
    ///
    /// The move is assumed legal; callers filter through
    /// [`legal_targets`](crate::movegen::legal_targets) first.
    pub fn play(&mut self, mv: Move) -> Played {
        let undo = self.board.apply(mv);
        let mover = undo.moved;

        if mover.kind == PieceKind::King {
            self.castling.clear_color(mover.color);
        }
        for sq in [mv.from, mv.to] {
            for color in Color::BOTH {
                if let Some(side) = CastleSide::from_corner(sq, color) {
                    self.castling.clear(color, side);
                }
            }
        }

        let irreversible = mover.kind == PieceKind::Pawn || undo.captured.is_some();
        self.halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        self.last_move = Some((mv.from, mv.to));
        self.side_to_move = self.side_to_move.opposite();

        Played {
            mv,
            moved: mover,
            captured: undo.captured,
            irreversible,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
