//! Game-level errors

use dig_engine::config::ConfigError;
use thiserror::Error;

/// Errors surfaced by game setup
///
/// Collision and gameplay steps never fail; only loading and scene
/// construction do.
#[derive(Error, Debug)]
pub enum GameError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scene node the game depends on was not found
    #[error("scene node missing: {0}")]
    MissingNode(&'static str),
}

/// Result alias for game setup
pub type GameResult<T> = Result<T, GameError>;
