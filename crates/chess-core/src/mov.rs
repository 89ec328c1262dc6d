//! Move representation.

use crate::{PieceKind, Square};
use std::fmt;

/// Special effects a move carries beyond relocating the mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    /// Plain move or capture.
    Normal,
    /// Pawn advancing two squares from its starting rank.
    DoublePush,
    /// Pawn capturing a pawn that just advanced two squares past it.
    EnPassant,
    /// King moving two squares toward the h-file rook.
    CastleKingside,
    /// King moving two squares toward the a-file rook.
    CastleQueenside,
    /// Pawn reaching the last rank and becoming the given kind.
    Promotion(PieceKind),
}

impl MoveFlag {
    /// Returns the promotion kind if this is a promotion move.
    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match self {
            MoveFlag::Promotion(kind) => Some(kind),
            _ => None,
        }
    }
}

/// A move from one square to another.
///
/// Flags are derived by the engine from the board; callers normally supply
/// only the two squares and, for promotions, the chosen kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub flag: MoveFlag,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        Move { from, to, flag }
    }

    /// Creates a move without special effects.
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Normal)
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.flag.promotion() {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.letter()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses UCI text into its squares and optional promotion kind.
    ///
    /// Only the squares are checked here; whether the move is legal, and
    /// which flag it carries, depends on the position.
    pub fn parse_uci(s: &str) -> Option<(Square, Square, Option<PieceKind>)> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => {
                let kind = PieceKind::from_letter(c)?;
                if !kind.is_promotion_target() {
                    return None;
                }
                Some(kind)
            }
            None => None,
        };
        Some((from, to, promotion))
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, {:?})", self.to_uci(), self.flag)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
