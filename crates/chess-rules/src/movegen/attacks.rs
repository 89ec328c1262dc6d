//! Attack sets and check detection.
//!
//! Attack mode answers "which squares does this piece hit", ignoring whose
//! turn it is, castling and king safety. Check detection is built only on
//! this mode, so it never calls back into the legality filter.

use chess_core::{Color, Piece, PieceKind, Square};

use crate::{Board, SquareSet};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Returns the squares the piece attacks.
///
/// Pawns attack both forward diagonals whether or not anything stands
/// there. Rays stop at, and include, the first occupied square of either
/// color.
pub fn attacks(board: &Board, piece: Piece) -> SquareSet {
    let from = piece.square;
    match piece.kind {
        PieceKind::Pawn => {
            let dr = piece.color.forward();
            steps(from, &[(-1, dr), (1, dr)])
        }
        PieceKind::Knight => steps(from, &KNIGHT_OFFSETS),
        PieceKind::King => steps(from, &KING_OFFSETS),
        PieceKind::Bishop => rays(board, from, &BISHOP_DIRECTIONS),
        PieceKind::Rook => rays(board, from, &ROOK_DIRECTIONS),
        PieceKind::Queen => {
            rays(board, from, &BISHOP_DIRECTIONS) | rays(board, from, &ROOK_DIRECTIONS)
        }
    }
}

fn steps(from: Square, offsets: &[(i8, i8)]) -> SquareSet {
    offsets
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .collect()
}

fn rays(board: &Board, from: Square, directions: &[(i8, i8)]) -> SquareSet {
    let mut set = SquareSet::EMPTY;
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            set.insert(next);
            if !board.is_vacant(next) {
                break;
            }
            current = next;
        }
    }
    set
}

/// Returns true if any piece of `by_color` attacks `sq`.
pub fn is_square_attacked(board: &Board, sq: Square, by_color: Color) -> bool {
    board
        .pieces_of(by_color)
        .any(|piece| attacks(board, piece).contains(sq))
}

/// Returns true if the king of the given color is attacked.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_square_attacked(board, king, color.opposite()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn lone(kind: PieceKind, at: &str) -> (Board, Piece) {
        let mut board = Board::empty();
        board.put(kind, Color::White, sq(at));
        let piece = board.piece_at(sq(at)).unwrap();
        (board, piece)
    }

    #[test]
    fn knight_attacks_center_and_corner() {
        let (board, knight) = lone(PieceKind::Knight, "d4");
        assert_eq!(attacks(&board, knight).len(), 8);
        let (board, knight) = lone(PieceKind::Knight, "a1");
        let set = attacks(&board, knight);
        assert_eq!(set.len(), 2);
        assert!(set.contains(sq("b3")));
        assert!(set.contains(sq("c2")));
    }

    #[test]
    fn king_attacks_edge() {
        let (board, king) = lone(PieceKind::King, "a4");
        assert_eq!(attacks(&board, king).len(), 5);
    }

    #[test]
    fn pawn_attacks_by_color() {
        let mut board = Board::empty();
        board.put(PieceKind::Pawn, Color::Black, sq("d4"));
        let pawn = board.piece_at(sq("d4")).unwrap();
        let set = attacks(&board, pawn);
        assert_eq!(set.len(), 2);
        assert!(set.contains(sq("c3")));
        assert!(set.contains(sq("e3")));

        let (board, pawn) = lone(PieceKind::Pawn, "h2");
        assert_eq!(attacks(&board, pawn), SquareSet::from_square(sq("g3")));
    }

    #[test]
    fn rook_ray_stops_at_first_blocker() {
        let (mut board, rook) = lone(PieceKind::Rook, "a1");
        board.put(PieceKind::Pawn, Color::White, sq("a3"));
        board.put(PieceKind::Pawn, Color::Black, sq("d1"));
        let set = attacks(&board, rook);
        assert!(set.contains(sq("a2")));
        assert!(set.contains(sq("a3")));
        assert!(!set.contains(sq("a4")));
        assert!(set.contains(sq("d1")));
        assert!(!set.contains(sq("e1")));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn queen_on_empty_board() {
        let (board, queen) = lone(PieceKind::Queen, "d4");
        assert_eq!(attacks(&board, queen).len(), 27);
    }

    #[test]
    fn square_attacked_startpos() {
        let board = Board::startpos();
        assert!(is_square_attacked(&board, sq("e3"), Color::White));
        assert!(is_square_attacked(&board, sq("f3"), Color::White));
        assert!(!is_square_attacked(&board, sq("e4"), Color::White));
        assert!(!is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
    }

    #[test]
    fn check_through_open_file() {
        let mut board = Board::empty();
        board.put(PieceKind::King, Color::White, sq("e1"));
        board.put(PieceKind::Rook, Color::Black, sq("e8"));
        assert!(is_in_check(&board, Color::White));

        board.put(PieceKind::Bishop, Color::White, sq("e4"));
        assert!(!is_in_check(&board, Color::White));
    }
}
