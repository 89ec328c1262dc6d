//! Rule variants, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the standard behaviour of this engine:
//!
//! ```toml
//! castling = "lenient"            # or "strict"
//! repetition_key = "occupancy"    # or "full"
//! history_scope = "since_irreversible"  # or "whole_game"
//! default_promotion = "queen"
//! ```

use chess_core::PieceKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// `default_promotion` names a kind a pawn cannot become.
    #[error("Pawns cannot promote to {0}")]
    InvalidPromotion(PieceKind),
}

/// How strictly castling is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CastlingCheck {
    /// Right, pieces in place and an empty path. Attacks on the king's
    /// path are not considered.
    #[default]
    Lenient,
    /// Additionally the king may not castle out of, through, or into check.
    Strict,
}

/// What identifies a position for threefold repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionKey {
    /// Piece placement only.
    #[default]
    Occupancy,
    /// Placement, side to move, castling rights and en passant square.
    Full,
}

/// Which positions the repetition history remembers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryScope {
    /// History restarts on every pawn move or capture.
    #[default]
    SinceIrreversible,
    /// Every position since the game began.
    WholeGame,
}

/// Rule configuration for a [`Game`](crate::Game).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub castling: CastlingCheck,
    #[serde(default)]
    pub repetition_key: RepetitionKey,
    #[serde(default)]
    pub history_scope: HistoryScope,
    /// Kind a pawn becomes when the caller names none.
    #[serde(default = "default_promotion")]
    pub default_promotion: PieceKind,
}

fn default_promotion() -> PieceKind {
    PieceKind::Queen
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            castling: CastlingCheck::default(),
            repetition_key: RepetitionKey::default(),
            history_scope: HistoryScope::default(),
            default_promotion: default_promotion(),
        }
    }
}

impl RulesConfig {
    /// Standard tournament rules: strict castling and full repetition keys
    /// over the whole game.
    pub fn strict() -> Self {
        RulesConfig {
            castling: CastlingCheck::Strict,
            repetition_key: RepetitionKey::Full,
            history_scope: HistoryScope::WholeGame,
            default_promotion: PieceKind::Queen,
        }
    }

    /// Loads the configuration at `path`.
    ///
    /// Returns the default configuration if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read,
    /// [`ConfigError::Parse`] if it contains invalid TOML, or
    /// [`ConfigError::InvalidPromotion`] for a pawn or king default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RulesConfig = toml::from_str(content)?;
        if !config.default_promotion.is_promotion_target() {
            return Err(ConfigError::InvalidPromotion(config.default_promotion));
        }
        Ok(config)
    }
}
