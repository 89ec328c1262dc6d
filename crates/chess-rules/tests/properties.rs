//! Properties checked over random playouts.

use chess_core::Square;
use chess_rules::{legal_moves, CastlingCheck, Game, Position, RulesConfig};
use proptest::prelude::*;

/// Plays up to `choices.len()` plies, picking each move by index.
fn playout(choices: &[usize], config: RulesConfig) -> (Game, Vec<Position>) {
    let mut game = Game::with_config(config);
    let mut seen = vec![game.position().clone()];
    for &choice in choices {
        let moves = game.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice % moves.len()];
        game.make_move(mv.from, mv.to, mv.flag.promotion())
            .expect("generated move is legal");
        seen.push(game.position().clone());
    }
    (game, seen)
}

fn board_is_consistent(position: &Position) -> bool {
    Square::all().all(|sq| {
        position
            .board
            .piece_at(sq)
            .map_or(true, |piece| piece.square == sq)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn side_to_move_alternates(choices in prop::collection::vec(any::<usize>(), 0..60)) {
        let (_, seen) = playout(&choices, RulesConfig::default());
        for pair in seen.windows(2) {
            prop_assert_eq!(pair[1].side_to_move, pair[0].side_to_move.opposite());
        }
    }

    #[test]
    fn pieces_know_their_square(choices in prop::collection::vec(any::<usize>(), 0..60)) {
        let (_, seen) = playout(&choices, RulesConfig::strict());
        for position in &seen {
            prop_assert!(board_is_consistent(position));
        }
    }

    #[test]
    fn apply_then_revert_is_identity(
        choices in prop::collection::vec(any::<usize>(), 0..40),
        pick in any::<usize>(),
    ) {
        let (game, _) = playout(&choices, RulesConfig::default());
        let moves = legal_moves(game.position(), CastlingCheck::Lenient);
        prop_assume!(!moves.is_empty());
        let mv = moves[pick % moves.len()];

        let mut board = game.board().clone();
        let undo = board.apply(mv);
        prop_assert_ne!(&board, game.board());
        board.revert(undo);
        prop_assert_eq!(&board, game.board());
    }

    #[test]
    fn save_roundtrip_preserves_state(choices in prop::collection::vec(any::<usize>(), 0..60)) {
        let (game, _) = playout(&choices, RulesConfig::default());
        let original = game.position();
        let restored = Position::from_save(&game.to_save()).expect("own save restores");
        prop_assert_eq!(&restored.board, &original.board);
        prop_assert_eq!(restored.side_to_move, original.side_to_move);
        prop_assert_eq!(restored.castling, original.castling);
        prop_assert_eq!(restored.halfmove_clock, original.halfmove_clock);
    }

    #[test]
    fn no_legal_move_leaves_own_king_attacked(
        choices in prop::collection::vec(any::<usize>(), 0..40),
    ) {
        let (game, _) = playout(&choices, RulesConfig::default());
        let position = game.position();
        for mv in legal_moves(position, CastlingCheck::Lenient) {
            let mut next = position.clone();
            next.play(mv);
            prop_assert!(!chess_rules::is_in_check(&next.board, position.side_to_move));
        }
    }
}
