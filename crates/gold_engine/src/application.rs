//! Application trait and lifecycle hooks

use std::time::Duration;

use crate::engine::{Game, GameError};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to hook game-specific logic into [`Game::run`]. Every
/// method has a no-op default.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame, after [`Game::init`]. Use this to
    /// register scene hooks or pick the first scene.
    fn initialize(&mut self, _game: &mut Game) -> Result<(), AppError> {
        Ok(())
    }

    /// Update the application
    ///
    /// Called every frame after the current scene has been updated.
    ///
    /// # Arguments
    /// * `game` - Mutable reference to the game
    /// * `dt` - Time since the previous frame
    fn update(&mut self, _game: &mut Game, _dt: Duration) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once after the frame loop has ended and the current scene has
    /// been stopped.
    fn cleanup(&mut self, _game: &mut Game) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Game error propagated to application level
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// The application that does nothing
impl Application for () {}
