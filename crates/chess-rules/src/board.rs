//! The 8×8 grid of pieces.
//!
//! Every cell holds at most one [`Piece`], and a piece's stored square always
//! names the cell holding it. All mutation goes through [`Board::put`],
//! [`Board::take`] and the reversible [`Board::apply`] / [`Board::revert`]
//! pair, which keep the two in step.

use chess_core::save::{EMPTY, RANK_SEPARATOR};
use chess_core::{Color, Move, MoveFlag, Piece, PieceKind, Square};
use std::fmt;

use crate::SquareSet;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Everything needed to take back a move applied with [`Board::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    /// The move as applied.
    pub mv: Move,
    /// The mover before it moved (original square and kind).
    pub moved: Piece,
    /// The piece removed by the move, en passant victims included.
    pub captured: Option<Piece>,
    /// Rook relocation performed by castling, as `(from, to)`.
    pub rook: Option<(Square, Square)>,
}

/// Piece placement on an 8×8 board.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board { cells: [None; 64] }
    }

    /// Creates the standard starting arrangement.
    pub fn startpos() -> Self {
        let mut board = Board::empty();
        for color in Color::BOTH {
            for (file, kind) in BACK_RANK.into_iter().enumerate() {
                if let Some(sq) = Square::from_coords(file as u8, color.back_rank()) {
                    board.put(kind, color, sq);
                }
                if let Some(sq) = Square::from_coords(file as u8, color.pawn_rank()) {
                    board.put(PieceKind::Pawn, color, sq);
                }
            }
        }
        board
    }

    /// Returns the piece on the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index() as usize]
    }

    #[inline]
    pub fn is_vacant(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Creates a piece on `sq`, returning whatever stood there before.
    pub fn put(&mut self, kind: PieceKind, color: Color, sq: Square) -> Option<Piece> {
        self.cells[sq.index() as usize].replace(Piece::new(kind, color, sq))
    }

    /// Removes and returns the piece on `sq`.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.index() as usize].take()
    }

    /// Puts a piece back on the square it records.
    fn restore(&mut self, piece: Piece) {
        self.cells[piece.square.index() as usize] = Some(piece);
    }

    /// Moves whatever stands on `from` to `to`, keeping its stored square in
    /// step with the grid.
    fn relocate(&mut self, from: Square, to: Square) {
        if let Some(mut piece) = self.take(from) {
            piece.square = to;
            self.restore(piece);
        }
    }

    /// Iterates over every piece from a1 toward h8.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Iterates over the pieces of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |p| p.color == color)
    }

    /// Squares occupied by the given color.
    pub fn occupancy(&self, color: Color) -> SquareSet {
        self.pieces_of(color).map(|p| p.square).collect()
    }

    /// Returns the square of the given color's king.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|p| p.kind == PieceKind::King)
            .map(|p| p.square)
    }

    /// Returns true if `sq` holds a piece of this kind and color.
    pub fn holds(&self, sq: Square, kind: PieceKind, color: Color) -> bool {
        matches!(self.piece_at(sq), Some(p) if p.kind == kind && p.color == color)
    }

    /// Encodes the placement, rank 8 first, one character per cell.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(71);
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let code = Square::from_coords(file, rank)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or(EMPTY, Piece::code);
                out.push(code);
            }
            if rank > 0 {
                out.push(RANK_SEPARATOR);
            }
        }
        out
    }

    /// Applies a move to the grid and returns the record that reverts it.
    ///
    /// Only the grid changes: turn, rights and clocks belong to
    /// [`Position`](crate::Position).
    ///
    /// # Panics
    ///
    /// Panics if `mv.from` is empty. Moves come from the generators, which
    /// only emit moves for pieces on the board.
    pub fn apply(&mut self, mv: Move) -> Undo {
        let moved = self.take(mv.from).expect("no piece on move source");

        let victim_square = match mv.flag {
            MoveFlag::EnPassant => {
                Square::from_coords(mv.to.file_index(), mv.from.rank_index()).unwrap_or(mv.to)
            }
            _ => mv.to,
        };
        let captured = self.take(victim_square);

        let kind = mv.flag.promotion().unwrap_or(moved.kind);
        self.put(kind, moved.color, mv.to);

        let rook = castling_rook(mv).filter(|&(rook_from, _)| !self.is_vacant(rook_from));
        if let Some((rook_from, rook_to)) = rook {
            self.relocate(rook_from, rook_to);
        }

        Undo {
            mv,
            moved,
            captured,
            rook,
        }
    }

    /// Takes back a move applied with [`Board::apply`].
    pub fn revert(&mut self, undo: Undo) {
        if let Some((rook_from, rook_to)) = undo.rook {
            self.relocate(rook_to, rook_from);
        }
        self.take(undo.mv.to);
        self.restore(undo.moved);
        if let Some(captured) = undo.captured {
            self.restore(captured);
        }
    }

    /// Applies `mv`, evaluates `f` on the result, then reverts.
    ///
    /// The grid is identical before and after the call.
    pub fn with_applied<R>(&mut self, mv: Move, f: impl FnOnce(&Board) -> R) -> R {
        let undo = self.apply(mv);
        let result = f(self);
        self.revert(undo);
        result
    }
}

/// Rook relocation for a castling move, as `(from, to)`.
fn castling_rook(mv: Move) -> Option<(Square, Square)> {
    let rank = mv.from.rank_index();
    let (from_file, to_file) = match mv.flag {
        MoveFlag::CastleKingside => (7, 5),
        MoveFlag::CastleQueenside => (0, 3),
        _ => return None,
    };
    Some((
        Square::from_coords(from_file, rank)?,
        Square::from_coords(to_file, rank)?,
    ))
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.placement())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, rank) in self.placement().split(RANK_SEPARATOR).enumerate() {
            write!(f, "{} ", 8 - row)?;
            for c in rank.chars() {
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}
