pub mod board;
pub mod error;
pub mod evaluation;
pub mod params;
pub mod search;
pub mod time;
pub mod types;
pub mod uci;

pub use board::{Applied, ChessBoard, Rules};
pub use error::EngineError;
pub use params::{EngineConfig, Weights};
pub use search::{SearchContext, Searcher};
pub use types::{EvaluatedMove, Interest, Perspective, Score, SearchResult};
