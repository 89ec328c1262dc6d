//! Move generation.
//!
//! Three layers, each built on the one before:
//! - attack mode ([`attacks`]): squares a piece hits, used for check detection
//! - pseudo-legal mode ([`pseudo_legal_targets`]): movement and occupancy rules,
//!   castling and en passant included, king safety ignored
//! - legal mode ([`legal_targets`], [`legal_moves`]): pseudo-legal targets that
//!   do not leave the mover's own king attacked

mod attacks;
pub mod perft;

use chess_core::{Color, Move, MoveFlag, Piece, PieceKind, Square};
use tracing::trace;

use crate::position::CastleSide;
use crate::{Board, CastlingCheck, Position, SquareSet};

pub use attacks::{attacks, is_in_check, is_square_attacked};

/// Returns the pseudo-legal targets of the piece on `from`.
///
/// Squares holding a friendly piece are never included. Empty when `from`
/// is vacant.
pub fn pseudo_legal_targets(
    position: &Position,
    from: Square,
    castling: CastlingCheck,
) -> SquareSet {
    let board = &position.board;
    let Some(piece) = board.piece_at(from) else {
        return SquareSet::EMPTY;
    };

    let targets = match piece.kind {
        PieceKind::Pawn => pawn_targets(position, piece),
        PieceKind::King => attacks(board, piece) | castling_targets(position, piece, castling),
        _ => attacks(board, piece),
    };
    targets & !board.occupancy(piece.color)
}

fn pawn_targets(position: &Position, pawn: Piece) -> SquareSet {
    let board = &position.board;
    let forward = pawn.color.forward();
    let mut targets = SquareSet::EMPTY;

    if let Some(one) = pawn.square.offset(0, forward).filter(|&sq| board.is_vacant(sq)) {
        targets.insert(one);
        if pawn.square.rank_index() == pawn.color.pawn_rank() {
            if let Some(two) = one.offset(0, forward).filter(|&sq| board.is_vacant(sq)) {
                targets.insert(two);
            }
        }
    }

    for target in attacks(board, pawn) {
        if board.piece_at(target).is_some_and(|p| p.color != pawn.color) {
            targets.insert(target);
        }
    }

    if let Some(target) = en_passant_target(position, pawn) {
        targets.insert(target);
    }

    targets
}

/// Returns the square `pawn` may capture onto en passant.
///
/// Requires the pawn on its fifth rank and the previous move to be an enemy
/// pawn's two-square advance landing right beside it.
pub(crate) fn en_passant_target(position: &Position, pawn: Piece) -> Option<Square> {
    if pawn.kind != PieceKind::Pawn || pawn.square.rank_index() != pawn.color.en_passant_rank() {
        return None;
    }
    let (src, dst) = position.last_move?;
    let enemy = pawn.color.opposite();
    let jumped = src.file_index() == dst.file_index()
        && src.rank_index() == enemy.pawn_rank()
        && src.rank_index().abs_diff(dst.rank_index()) == 2;
    let beside = dst.rank_index() == pawn.square.rank_index()
        && dst.file_index().abs_diff(pawn.square.file_index()) == 1;

    if jumped && beside && position.board.holds(dst, PieceKind::Pawn, enemy) {
        dst.offset(0, pawn.color.forward())
    } else {
        None
    }
}

fn castling_targets(position: &Position, king: Piece, castling: CastlingCheck) -> SquareSet {
    let board = &position.board;
    let color = king.color;
    let rank = color.back_rank();
    let mut targets = SquareSet::EMPTY;

    if Square::from_coords(4, rank) != Some(king.square) {
        return targets;
    }

    for side in [CastleSide::Kingside, CastleSide::Queenside] {
        if !position.castling.has(color, side) {
            continue;
        }
        let rook_home = Square::from_coords(side.rook_file(), rank);
        if !rook_home.is_some_and(|sq| board.holds(sq, PieceKind::Rook, color)) {
            continue;
        }
        let between_clear = side
            .between_files()
            .iter()
            .filter_map(|&file| Square::from_coords(file, rank))
            .all(|sq| board.is_vacant(sq));
        if !between_clear {
            continue;
        }
        let (Some(crossed), Some(target)) = (
            Square::from_coords(side.rook_target_file(), rank),
            Square::from_coords(side.king_target_file(), rank),
        ) else {
            continue;
        };
        if castling == CastlingCheck::Strict
            && (is_in_check(board, color)
                || is_square_attacked(board, crossed, color.opposite())
                || is_square_attacked(board, target, color.opposite()))
        {
            continue;
        }
        targets.insert(target);
    }

    targets
}

/// Builds the move `from` → `to` with the flag the board implies.
///
/// A pawn reaching its last rank becomes `promotion`, or a queen when no
/// choice is given.
pub fn classify(board: &Board, from: Square, to: Square, promotion: Option<PieceKind>) -> Move {
    let flag = match board.piece_at(from) {
        Some(p) if p.kind == PieceKind::Pawn => {
            if to.rank_index() == p.color.promotion_rank() {
                MoveFlag::Promotion(promotion.unwrap_or(PieceKind::Queen))
            } else if from.file_index() != to.file_index() && board.is_vacant(to) {
                MoveFlag::EnPassant
            } else if from.rank_index().abs_diff(to.rank_index()) == 2 {
                MoveFlag::DoublePush
            } else {
                MoveFlag::Normal
            }
        }
        Some(p)
            if p.kind == PieceKind::King && from.file_index().abs_diff(to.file_index()) == 2 =>
        {
            if to.file_index() > from.file_index() {
                MoveFlag::CastleKingside
            } else {
                MoveFlag::CastleQueenside
            }
        }
        _ => MoveFlag::Normal,
    };
    Move::new(from, to, flag)
}

/// Returns the legal targets of the piece on `from`.
///
/// Each pseudo-legal candidate is tried on a scratch copy of the board and
/// taken back again; candidates that leave the mover's king attacked are
/// dropped.
pub fn legal_targets(position: &Position, from: Square, castling: CastlingCheck) -> SquareSet {
    let Some(piece) = position.board.piece_at(from) else {
        return SquareSet::EMPTY;
    };
    let mut targets = pseudo_legal_targets(position, from, castling);

    let mut scratch = position.board.clone();
    targets.retain(|to| {
        let mv = classify(&scratch, from, to, None);
        let exposed = scratch.with_applied(mv, |board| is_in_check(board, piece.color));
        if exposed {
            trace!(%mv, "candidate leaves own king attacked");
        }
        !exposed
    });
    targets
}

/// Returns every legal move for the side to move.
///
/// A promoting pawn contributes one move per promotion kind.
pub fn legal_moves(position: &Position, castling: CastlingCheck) -> Vec<Move> {
    let mut moves = Vec::new();
    for piece in position.board.pieces_of(position.side_to_move) {
        for to in legal_targets(position, piece.square, castling) {
            let mv = classify(&position.board, piece.square, to, None);
            if mv.flag.promotion().is_some() {
                moves.extend(
                    PieceKind::PROMOTIONS
                        .iter()
                        .map(|&kind| Move::new(mv.from, mv.to, MoveFlag::Promotion(kind))),
                );
            } else {
                moves.push(mv);
            }
        }
    }
    moves
}

/// Returns true if `color` has at least one legal move.
pub fn has_legal_move(position: &Position, color: Color, castling: CastlingCheck) -> bool {
    position
        .board
        .pieces_of(color)
        .any(|piece| !legal_targets(position, piece.square, castling).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn position(save: &str) -> Position {
        Position::from_save(save).unwrap()
    }

    #[test]
    fn startpos_has_twenty_moves_each_side() {
        let mut pos = Position::startpos();
        assert_eq!(legal_moves(&pos, CastlingCheck::Lenient).len(), 20);
        pos.side_to_move = Color::Black;
        assert_eq!(legal_moves(&pos, CastlingCheck::Lenient).len(), 20);
    }

    #[test]
    fn pawn_single_and_double_push() {
        let pos = Position::startpos();
        let targets = legal_targets(&pos, sq("a2"), CastlingCheck::Lenient);
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(sq("a3")));
        assert!(targets.contains(sq("a4")));
        assert!(!targets.contains(sq("a5")));
    }

    #[test]
    fn pawn_double_push_needs_both_squares_empty() {
        let pos = position(
            "false;false;false;false;white;0;\
             ....k.../......../......../......../p......./.p....../PP....../....K...",
        );
        assert!(pseudo_legal_targets(&pos, sq("a2"), CastlingCheck::Lenient)
            .contains(sq("a3")));
        assert!(!pseudo_legal_targets(&pos, sq("a2"), CastlingCheck::Lenient)
            .contains(sq("a4")));
        // b2 is blocked immediately, so neither push is available.
        let b2 = pseudo_legal_targets(&pos, sq("b2"), CastlingCheck::Lenient);
        assert!(!b2.contains(sq("b3")));
        assert!(!b2.contains(sq("b4")));
    }

    #[test]
    fn pawn_off_start_rank_has_no_double_push() {
        let pos = position(
            "false;false;false;false;white;0;\
             ....k.../......../......../......../......../P......./......../....K...",
        );
        let targets = pseudo_legal_targets(&pos, sq("a3"), CastlingCheck::Lenient);
        assert_eq!(targets, SquareSet::from_square(sq("a4")));
    }

    #[test]
    fn pawn_captures_only_enemies() {
        let pos = position(
            "false;false;false;false;white;0;\
             ....k.../......../......../......../......../n.N...../.P....../....K...",
        );
        let targets = pseudo_legal_targets(&pos, sq("b2"), CastlingCheck::Lenient);
        assert!(targets.contains(sq("a3")));
        assert!(!targets.contains(sq("c3")));
    }

    #[test]
    fn slider_ray_includes_enemy_excludes_friend() {
        let pos = position(
            "false;false;false;false;white;0;\
             ....k.../......../......../......../......../p......./......../R..N.K..",
        );
        let targets = pseudo_legal_targets(&pos, sq("a1"), CastlingCheck::Lenient);
        assert!(targets.contains(sq("a2")));
        assert!(targets.contains(sq("a3")));
        assert!(!targets.contains(sq("a4")));
        assert!(targets.contains(sq("c1")));
        assert!(!targets.contains(sq("d1")));
        assert_eq!(targets.len(), 4);
    }

    #[test]
    fn knight_targets_at_start() {
        let pos = Position::startpos();
        let targets = legal_targets(&pos, sq("b1"), CastlingCheck::Lenient);
        let expected: SquareSet = [sq("a3"), sq("c3")].into_iter().collect();
        assert_eq!(targets, expected);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let pos = position(
            "false;false;false;false;white;0;\
             ....r..k/......../......../......../......../......../....B.../....K...",
        );
        assert!(!pseudo_legal_targets(&pos, sq("e2"), CastlingCheck::Lenient).is_empty());
        assert!(legal_targets(&pos, sq("e2"), CastlingCheck::Lenient).is_empty());
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let pos = position(
            "false;false;false;false;white;0;\
             ...r...k/......../......../......../......../......../......../....K...",
        );
        let targets = legal_targets(&pos, sq("e1"), CastlingCheck::Lenient);
        assert!(!targets.contains(sq("d1")));
        assert!(!targets.contains(sq("d2")));
        assert!(targets.contains(sq("f2")));
    }

    #[test]
    fn lenient_castling_ignores_attacked_path() {
        let save = "true;false;false;false;white;0;\
                    ....kr../......../......../......../......../......../......../....K..R";
        let pos = position(save);
        assert!(legal_targets(&pos, Square::E1, CastlingCheck::Lenient).contains(Square::G1));
        assert!(!legal_targets(&pos, Square::E1, CastlingCheck::Strict).contains(Square::G1));
    }

    #[test]
    fn strict_castling_refuses_out_of_check() {
        let pos = position(
            "true;true;false;false;white;0;\
             ....r..k/......../......../......../......../......../......../R...K..R",
        );
        let strict = legal_targets(&pos, Square::E1, CastlingCheck::Strict);
        assert!(!strict.contains(Square::G1));
        assert!(!strict.contains(Square::C1));
    }

    #[test]
    fn queenside_castling_needs_b_file_empty() {
        let pos = position(
            "false;true;false;false;white;0;\
             ....k.../......../......../......../......../......../......../RN..K...",
        );
        assert!(!legal_targets(&pos, Square::E1, CastlingCheck::Lenient).contains(Square::C1));
    }

    #[test]
    fn en_passant_needs_previous_double_push() {
        let mut pos = position(
            "false;false;false;false;white;0;\
             ....k.../......../......../...pP.../......../......../......../....K...",
        );
        let e5 = sq("e5");
        assert!(!legal_targets(&pos, e5, CastlingCheck::Lenient).contains(sq("d6")));

        pos.last_move = Some((sq("d7"), sq("d5")));
        assert!(legal_targets(&pos, e5, CastlingCheck::Lenient).contains(sq("d6")));

        pos.last_move = Some((sq("d6"), sq("d5")));
        assert!(!legal_targets(&pos, e5, CastlingCheck::Lenient).contains(sq("d6")));
    }

    #[test]
    fn promotions_expand_to_four_moves() {
        let pos = position(
            "false;false;false;false;white;0;\
             .......k/P......./......../......../......../......../......../....K...",
        );
        let promotions = legal_moves(&pos, CastlingCheck::Lenient)
            .into_iter()
            .filter(|m| m.flag.promotion().is_some())
            .count();
        assert_eq!(promotions, 4);
    }

    #[test]
    fn classify_flags() {
        let board = Board::startpos();
        assert_eq!(classify(&board, sq("e2"), sq("e4"), None).flag, MoveFlag::DoublePush);
        assert_eq!(classify(&board, sq("e2"), sq("e3"), None).flag, MoveFlag::Normal);
        assert_eq!(classify(&board, sq("g1"), sq("f3"), None).flag, MoveFlag::Normal);
        assert_eq!(
            classify(&board, Square::E1, Square::G1, None).flag,
            MoveFlag::CastleKingside
        );
        assert_eq!(
            classify(&board, Square::E1, Square::C1, None).flag,
            MoveFlag::CastleQueenside
        );
    }

    #[test]
    fn legal_targets_leave_position_untouched() {
        let pos = Position::startpos();
        let before = pos.clone();
        for piece in pos.board.pieces() {
            let _ = legal_targets(&pos, piece.square, CastlingCheck::Strict);
        }
        assert_eq!(pos, before);
    }
}
