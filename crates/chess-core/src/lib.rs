//! Core types for chess.
//!
//! This crate provides the value types shared by the rules engine and its
//! collaborators:
//! - [`PieceKind`], [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] for move representation
//! - [`SaveRecord`] parsing and serialization of saved games

mod color;
mod mov;
mod piece;
pub mod save;
mod square;

pub use color::Color;
pub use mov::{Move, MoveFlag};
pub use piece::{code_for, Piece, PieceKind};
pub use save::{CastlingFlags, DecodeError, SaveRecord};
pub use square::{File, Rank, Square};
