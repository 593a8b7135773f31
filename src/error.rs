use std::io;

use shakmaty::fen::ParseFenError;
use shakmaty::{Chess, PositionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("malformed config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("cannot write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid fen: {0}")]
    Fen(#[from] ParseFenError),

    #[error("illegal position: {0}")]
    Position(#[from] PositionError<Chess>),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("malformed command: {0}")]
    Command(String),
}
