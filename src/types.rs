use shakmaty::Move;

pub type Score = i32;

pub const DEFAULT_DEPTH: u32 = 3;

/// Remaining time reported when the harness gives no clock at all.
pub const UNBOUNDED_MS: u64 = u64::MAX;

/// How much a move deserves a deeper look. Only used to extend search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Interest {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// Which side owns the ply being scored, relative to the root mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    Mover,
    Opponent,
}

impl Perspective {
    pub fn flip(self) -> Self {
        match self {
            Perspective::Mover => Perspective::Opponent,
            Perspective::Opponent => Perspective::Mover,
        }
    }

    /// Perspective owning ply `depth` (1-based) of a search rooted at the mover.
    pub fn at_depth(depth: u32) -> Self {
        if depth % 2 == 1 {
            Perspective::Mover
        } else {
            Perspective::Opponent
        }
    }
}

/// A candidate move together with its score and interest at one ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatedMove {
    pub mv: Move,
    pub score: Score,
    pub interest: Interest,
}

impl EvaluatedMove {
    pub fn new(mv: Move) -> Self {
        Self {
            mv,
            score: 0,
            interest: Interest::None,
        }
    }
}

pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: Score,
    pub depth: u32,
    pub nodes: u64,
    /// Mover's material over the opponent's. Diagnostic only.
    pub leverage: f64,
    pub elapsed_ms: u64,
}
