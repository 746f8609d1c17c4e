use std::io;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Cell state is inconsistent")]
    InvalidCell,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failures while writing or reading a save file.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Save file I/O failed")]
    Io(#[from] io::Error),
    #[error("Save file is not valid INI")]
    Parse(#[from] ini::ParseError),
    #[error("Not a save file, missing Game/width")]
    NotASave,
    #[error("Missing key {0}")]
    MissingKey(String),
    #[error("Invalid value {value:?} for key {key}")]
    InvalidValue { key: String, value: String },
    #[error("Invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: u64, height: u64 },
    #[error("Invalid cell state at ({x}, {y})")]
    InvalidCell { x: crate::Coord, y: crate::Coord },
    #[error(transparent)]
    Game(#[from] GameError),
}
