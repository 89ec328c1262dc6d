//! Full game management with history tracking.
//!
//! The [`Game`] struct is the rule engine's front door:
//! - Legal targets and moves for the side to move
//! - Move execution with promotion, castling and en passant
//! - Repetition history and the outcome evaluator
//! - Draw claiming and agreement
//! - Save and restore

use chess_core::{Color, Move, PieceKind, Square};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collaborators::{BoardRenderer, Players, ReportError, ResultRecorder};
use crate::movegen::{self, classify};
use crate::outcome::{evaluate, FIFTY_MOVE_PLIES};
use crate::{
    Board, DrawReason, HistoryScope, Outcome, Position, PositionError, RulesConfig, SquareSet,
};

/// Error type for game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The game has already ended.
    #[error("game has already ended")]
    GameOver,
    #[error("no piece on {0}")]
    EmptySquare(Square),
    #[error("piece on {0} belongs to the side not on move")]
    NotYourPiece(Square),
    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("pawns cannot promote to {0}")]
    InvalidPromotion(PieceKind),
    /// Cannot claim draw (conditions not met).
    #[error("cannot claim draw: conditions not met")]
    CannotClaimDraw,
    #[error("invalid UCI move: {0}")]
    InvalidUci(String),
}

/// A chess game with history tracking.
///
/// Unlike [`Position`], which represents a single board state, `Game` keeps
/// the repetition history and the outcome, and refuses moves once the game
/// is over.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    /// Repetition keys of positions reached, current one last.
    history: Vec<String>,
    outcome: Outcome,
    config: RulesConfig,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::with_config(RulesConfig::default())
    }

    pub fn with_config(config: RulesConfig) -> Self {
        Self::from_position(Position::startpos(), config)
    }

    /// Creates a game from a custom starting position.
    ///
    /// The position is evaluated immediately, so a game may start finished.
    pub fn from_position(position: Position, config: RulesConfig) -> Self {
        let history = vec![position.repetition_key(config.repetition_key)];
        let outcome = evaluate(&position, &history, &config);
        Game {
            position,
            history,
            outcome,
            config,
        }
    }

    /// Restores a game from save-record text.
    pub fn from_save(text: &str, config: RulesConfig) -> Result<Self, PositionError> {
        let position = Position::from_save(text).inspect_err(|e| {
            warn!(error = %e, "rejected save record");
        })?;
        Ok(Self::from_position(position, config))
    }

    /// Serializes the current position as save-record text.
    pub fn to_save(&self) -> String {
        self.position.to_save()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn board(&self) -> &Board {
        &self.position.board
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    /// Repetition keys remembered for the current history scope.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Returns how many times the current position occurs in history.
    pub fn position_count(&self) -> usize {
        let key = self.position.repetition_key(self.config.repetition_key);
        self.history.iter().filter(|k| **k == key).count()
    }

    /// Returns the legal destinations of the piece on `from`.
    ///
    /// Empty once the game is over.
    pub fn legal_targets(&self, from: Square) -> Result<SquareSet, GameError> {
        let piece = self
            .position
            .board
            .piece_at(from)
            .ok_or(GameError::EmptySquare(from))?;
        if piece.color != self.position.side_to_move {
            return Err(GameError::NotYourPiece(from));
        }
        if self.is_game_over() {
            return Ok(SquareSet::EMPTY);
        }
        Ok(movegen::legal_targets(&self.position, from, self.config.castling))
    }

    /// Returns all legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        movegen::legal_moves(&self.position, self.config.castling)
    }

    /// Plays `from` → `to` for the side to move and returns the new outcome.
    ///
    /// `promotion` is only consulted when a pawn reaches its last rank;
    /// `None` there means the configured default. The game is unchanged
    /// when an error is returned.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Outcome, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        let targets = self.legal_targets(from)?;
        if !targets.contains(to) {
            debug!(%from, %to, "rejected illegal move");
            return Err(GameError::IllegalMove(format!("{}{}", from, to)));
        }

        let choice = promotion.unwrap_or(self.config.default_promotion);
        let mv = classify(&self.position.board, from, to, Some(choice));
        if mv.flag.promotion().is_some() && !choice.is_promotion_target() {
            debug!(%from, %to, kind = %choice, "rejected promotion");
            return Err(GameError::InvalidPromotion(choice));
        }

        let played = self.position.play(mv);
        if played.irreversible && self.config.history_scope == HistoryScope::SinceIrreversible {
            self.history.clear();
        }
        self.history
            .push(self.position.repetition_key(self.config.repetition_key));
        self.outcome = evaluate(&self.position, &self.history, &self.config);

        debug!(mv = %mv, halfmove_clock = self.position.halfmove_clock, "applied move");
        if self.outcome.is_terminal() {
            info!(outcome = %self.outcome, "game over");
        }
        Ok(self.outcome)
    }

    /// Plays a move given in UCI notation (e.g. "e2e4", "e7e8n").
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Outcome, GameError> {
        let (from, to, promotion) =
            Move::parse_uci(uci).ok_or_else(|| GameError::InvalidUci(uci.to_string()))?;
        self.make_move(from, to, promotion)
    }

    /// Returns true if the side to move may claim a fifty-move draw.
    pub fn can_claim_draw(&self) -> bool {
        !self.is_game_over() && self.position.halfmove_clock >= FIFTY_MOVE_PLIES
    }

    /// Claims a draw under the fifty-move rule.
    pub fn claim_draw(&mut self) -> Result<Outcome, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        if !self.can_claim_draw() {
            return Err(GameError::CannotClaimDraw);
        }
        self.finish(Outcome::Draw(DrawReason::FiftyMoveRule));
        Ok(self.outcome)
    }

    /// Ends the game as a draw both players agreed to.
    pub fn agree_draw(&mut self) -> Result<Outcome, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        self.finish(Outcome::Draw(DrawReason::Agreement));
        Ok(self.outcome)
    }

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = outcome;
        info!(outcome = %outcome, "game over");
    }

    /// Draws the board, highlighting the legal targets of `selected`.
    pub fn render<R: BoardRenderer>(
        &self,
        renderer: &mut R,
        selected: Option<Square>,
    ) -> Result<(), R::Error> {
        let highlights = selected
            .and_then(|sq| self.legal_targets(sq).ok())
            .unwrap_or(SquareSet::EMPTY);
        renderer.render(&self.position.board, highlights)
    }

    /// Hands the finished result to `recorder`.
    pub fn report<R>(
        &self,
        recorder: &mut R,
        players: &Players,
    ) -> Result<(), ReportError<R::Error>>
    where
        R: ResultRecorder,
        R::Error: std::error::Error + 'static,
    {
        if !self.is_game_over() {
            return Err(ReportError::NotFinished);
        }
        recorder
            .record(players, self.outcome)
            .map_err(ReportError::Recorder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Standings, TextRenderer};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.outcome(), Outcome::InProgress);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.position_count(), 1);
    }

    #[test]
    fn make_moves() {
        let mut game = Game::new();
        game.make_move(sq("e2"), sq("e4"), None).unwrap();
        game.make_move_uci("e7e5").unwrap();
        assert_eq!(game.side_to_move(), Color::White);
        assert!(game.board().holds(sq("e5"), PieceKind::Pawn, Color::Black));
    }

    #[test]
    fn rejects_wrong_side_and_empty_square() {
        let mut game = Game::new();
        assert_eq!(
            game.make_move(sq("e7"), sq("e5"), None),
            Err(GameError::NotYourPiece(sq("e7")))
        );
        assert_eq!(
            game.make_move(sq("e4"), sq("e5"), None),
            Err(GameError::EmptySquare(sq("e4")))
        );
    }

    #[test]
    fn illegal_move_leaves_state_untouched() {
        let mut game = Game::new();
        let before = game.to_save();
        assert!(matches!(
            game.make_move(sq("e2"), sq("e5"), None),
            Err(GameError::IllegalMove(_))
        ));
        assert_eq!(game.to_save(), before);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn invalid_uci() {
        let mut game = Game::new();
        assert_eq!(
            game.make_move_uci("e2"),
            Err(GameError::InvalidUci("e2".to_string()))
        );
    }

    #[test]
    fn promotion_choice_and_default() {
        let save = "false;false;false;false;white;0;\
            ......k./P......./......../......../......../......../......../....K...";
        let mut game = Game::from_save(save, RulesConfig::default()).unwrap();
        game.make_move(sq("a7"), sq("a8"), Some(PieceKind::Knight)).unwrap();
        assert!(game.board().holds(Square::A8, PieceKind::Knight, Color::White));

        let mut game = Game::from_save(save, RulesConfig::default()).unwrap();
        game.make_move(sq("a7"), sq("a8"), None).unwrap();
        assert!(game.board().holds(Square::A8, PieceKind::Queen, Color::White));
    }

    #[test]
    fn promotion_to_king_rejected() {
        let save = "false;false;false;false;white;0;\
            ......k./P......./......../......../......../......../......../....K...";
        let mut game = Game::from_save(save, RulesConfig::default()).unwrap();
        assert_eq!(
            game.make_move(sq("a7"), sq("a8"), Some(PieceKind::King)),
            Err(GameError::InvalidPromotion(PieceKind::King))
        );
        assert_eq!(game.to_save(), save);
    }

    #[test]
    fn promotion_choice_ignored_on_plain_move() {
        let mut game = Game::new();
        game.make_move(sq("e2"), sq("e4"), Some(PieceKind::King)).unwrap();
        assert!(game.board().holds(sq("e4"), PieceKind::Pawn, Color::White));
    }

    #[test]
    fn irreversible_move_clears_history() {
        let mut game = Game::new();
        game.make_move_uci("g1f3").unwrap();
        assert_eq!(game.history().len(), 2);
        game.make_move_uci("e7e5").unwrap();
        assert_eq!(game.history().len(), 1);

        let mut game = Game::with_config(RulesConfig {
            history_scope: HistoryScope::WholeGame,
            ..RulesConfig::default()
        });
        game.make_move_uci("g1f3").unwrap();
        game.make_move_uci("e7e5").unwrap();
        assert_eq!(game.history().len(), 3);
    }

    #[test]
    fn fifty_move_claim() {
        let save = "false;false;false;false;white;99;\
            ....k.../......../......../......../......../......../......../R...K...";
        let mut game = Game::from_save(save, RulesConfig::default()).unwrap();
        assert!(!game.can_claim_draw());
        assert_eq!(game.claim_draw(), Err(GameError::CannotClaimDraw));

        game.make_move_uci("a1a2").unwrap();
        assert_eq!(game.outcome(), Outcome::InProgress);
        assert!(game.can_claim_draw());
        assert_eq!(
            game.claim_draw(),
            Ok(Outcome::Draw(DrawReason::FiftyMoveRule))
        );
        assert_eq!(game.make_move_uci("e8e7"), Err(GameError::GameOver));
    }

    #[test]
    fn agreed_draw_ends_game() {
        let mut game = Game::new();
        assert_eq!(
            game.agree_draw(),
            Ok(Outcome::Draw(DrawReason::Agreement))
        );
        assert!(game.is_game_over());
        assert!(game.legal_moves().is_empty());
        assert_eq!(game.legal_targets(sq("e2")), Ok(SquareSet::EMPTY));
        assert_eq!(game.agree_draw(), Err(GameError::GameOver));
    }

    #[test]
    fn restored_finished_game() {
        let mate = "false;false;false;false;black;0;\
            R......k/......pp/......../......../......../......../......../......K.";
        let game = Game::from_save(mate, RulesConfig::default()).unwrap();
        assert_eq!(
            game.outcome(),
            Outcome::Checkmate {
                winner: Color::White
            }
        );
    }

    #[test]
    fn from_save_rejects_bad_record() {
        assert!(Game::from_save("nonsense", RulesConfig::default()).is_err());
    }

    #[test]
    fn render_highlights_selection() {
        let game = Game::new();
        let mut renderer = TextRenderer::new(Vec::new());
        game.render(&mut renderer, Some(sq("b1"))).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.contains("3 *. .*. . . . . ."));
    }

    #[test]
    fn report_requires_finished_game() {
        let mut standings = Standings::new();
        let players = Players::new("alice", "bob");
        let mut game = Game::new();
        assert!(matches!(
            game.report(&mut standings, &players),
            Err(ReportError::NotFinished)
        ));

        game.agree_draw().unwrap();
        game.report(&mut standings, &players).unwrap();
        assert_eq!(standings.get("alice").draws, 1);
    }
}
