use arrayvec::ArrayVec;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shakmaty::{CastlingMode, Move};

use crate::board::{Applied, Rules};
use crate::evaluation::{self, leverage};
use crate::params::{EngineConfig, Weights};
use crate::time::Clock;
use crate::types::{EvaluatedMove, Perspective, Score, SearchResult};

/// Where a node sits in the tree. Passed down by value, one per ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchContext {
    /// Current ply, 1 at the root moves.
    pub depth: u32,
    /// Deepest ply that may be scored below this node.
    pub max_depth: u32,
    /// Who owns this ply, relative to the root mover.
    pub perspective: Perspective,
}

impl SearchContext {
    pub fn root(max_depth: u32) -> Self {
        Self {
            depth: 1,
            max_depth,
            perspective: Perspective::Mover,
        }
    }

    /// Context for the replies one ply down.
    pub fn descend(self, max_depth: u32) -> Self {
        Self {
            depth: self.depth + 1,
            max_depth,
            perspective: self.perspective.flip(),
        }
    }
}

/// Exhaustive fixed-depth searcher. Holds no state between `think` calls
/// except the random source.
pub struct Searcher<R: Rng = StdRng> {
    weights: Weights,
    base_depth: u32,
    hard_deadline_ms: Option<u64>,
    rng: R,
    nodes: u64,
    clock: Clock,
}

impl Searcher<StdRng> {
    pub fn new(config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<R: Rng> Searcher<R> {
    pub fn with_rng(config: &EngineConfig, rng: R) -> Self {
        Self {
            weights: config.weights.clone(),
            base_depth: config.base_depth.max(1),
            hard_deadline_ms: config.hard_deadline_ms,
            rng,
            nodes: 0,
            clock: Clock::start(u64::MAX, None),
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn base_depth(&self) -> u32 {
        self.base_depth
    }

    pub fn set_base_depth(&mut self, depth: u32) {
        self.base_depth = depth.max(1);
    }

    pub fn set_hard_deadline(&mut self, ms: Option<u64>) {
        self.hard_deadline_ms = ms;
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Picks a move for the side to move. The board must have a legal move.
    pub fn think<B: Rules + ?Sized>(&mut self, board: &mut B, remaining_ms: u64) -> Move {
        let result = self.search(board, remaining_ms);
        result.best_move.expect("think called on a finished game")
    }

    /// Full root search. `best_move` is `None` only when the game is already over.
    pub fn search<B: Rules + ?Sized>(&mut self, board: &mut B, remaining_ms: u64) -> SearchResult {
        self.nodes = 0;
        self.clock = Clock::start(remaining_ms, self.hard_deadline_ms);

        let leverage = leverage(&*board, &self.weights);
        let moves = board.legal_moves();
        if moves.is_empty() {
            return SearchResult {
                best_move: None,
                score: 0,
                depth: self.base_depth,
                nodes: 0,
                leverage,
                elapsed_ms: 0,
            };
        }

        let best = self.select_best_move(&moves, board, SearchContext::root(self.base_depth));

        let elapsed_ms = self.clock.elapsed_ms();
        debug!(
            "leverage {leverage:.3} nodes {} elapsed {elapsed_ms} ms of {} ms, best {} score {}",
            self.nodes,
            self.clock.budget_ms(),
            best.mv.to_uci(CastlingMode::Standard),
            best.score
        );

        SearchResult {
            best_move: Some(best.mv),
            score: best.score,
            depth: self.base_depth,
            nodes: self.nodes,
            leverage,
            elapsed_ms,
        }
    }

    /// Scores every move. Output order matches `moves`.
    pub fn evaluate_all<B: Rules + ?Sized>(
        &mut self,
        moves: &[Move],
        board: &mut B,
        ctx: SearchContext,
    ) -> ArrayVec<EvaluatedMove, 256> {
        moves
            .iter()
            .map(|mv| self.evaluate_move(mv, &mut *board, ctx))
            .collect()
    }

    /// Evaluates every move and returns the best one for whoever owns this ply.
    ///
    /// A random candidate is the starting best; it is only replaced by a
    /// strictly better score, so among equal scores the seed wins, then the
    /// earliest move.
    ///
    /// At the root, candidates finished after the hard deadline are dropped:
    /// only moves whose whole subtree was searched compete, unless even the
    /// first one ran out of time.
    pub fn select_best_move<B: Rules + ?Sized>(
        &mut self,
        moves: &[Move],
        board: &mut B,
        ctx: SearchContext,
    ) -> EvaluatedMove {
        assert!(!moves.is_empty(), "no legal moves to choose from");

        let evaluated = if ctx.depth == 1 {
            self.evaluate_root(moves, board, ctx)
        } else {
            self.evaluate_all(moves, board, ctx)
        };
        let mut best = evaluated[self.rng.gen_range(0..evaluated.len())];

        for candidate in &evaluated {
            let better = match ctx.perspective {
                Perspective::Mover => candidate.score > best.score,
                Perspective::Opponent => candidate.score < best.score,
            };
            if better {
                best = *candidate;
            }
        }

        best
    }

    /// Like [`Self::evaluate_all`], but stops at the first root candidate
    /// that completes after the hard deadline.
    fn evaluate_root<B: Rules + ?Sized>(
        &mut self,
        moves: &[Move],
        board: &mut B,
        ctx: SearchContext,
    ) -> ArrayVec<EvaluatedMove, 256> {
        let mut evaluated = ArrayVec::new();
        for mv in moves {
            let candidate = self.evaluate_move(mv, &mut *board, ctx);
            if self.clock.past_deadline() {
                if evaluated.is_empty() {
                    evaluated.push(candidate);
                }
                info!(
                    "hard deadline hit, {} of {} root moves fully searched",
                    evaluated.len(),
                    moves.len()
                );
                break;
            }
            evaluated.push(candidate);
        }
        evaluated
    }

    /// Scores one move and, depth permitting, folds in the opponent's best reply.
    pub fn evaluate_move<B: Rules + ?Sized>(
        &mut self,
        mv: &Move,
        board: &mut B,
        ctx: SearchContext,
    ) -> EvaluatedMove {
        debug_assert_eq!(ctx.perspective, Perspective::at_depth(ctx.depth));
        self.nodes += 1;

        let scored = evaluation::score_move(mv, board, ctx.perspective, &self.weights);
        let mut evaluated = EvaluatedMove {
            mv: *mv,
            score: evaluation::root_frame_score(&scored, ctx.depth, ctx.perspective, &self.weights),
            interest: scored.interest,
        };

        let max_depth = self.depth_to_explore(ctx, &evaluated);
        if ctx.depth < max_depth && !self.clock.past_deadline() {
            let mut after = Applied::new(board, mv);
            let replies = after.legal_moves();
            if !replies.is_empty() {
                let reply = self.select_best_move(&replies, &mut *after, ctx.descend(max_depth));
                evaluated.score = fold(evaluated.score, reply.score);
            }
        }

        evaluated
    }

    /// The interest bonus is granted once, at the root plies, while time allows.
    fn depth_to_explore(&self, ctx: SearchContext, evaluated: &EvaluatedMove) -> u32 {
        if ctx.depth == 1 && self.clock.remaining_ms() > self.weights.extension_gate_ms {
            ctx.max_depth + self.weights.interest_bonus.get(evaluated.interest)
        } else {
            ctx.max_depth
        }
    }
}

/// Reply scores are already in the root mover's frame.
fn fold(score: Score, reply: Score) -> Score {
    score.saturating_add(reply)
}

/// Format a score for UCI output.
pub fn format_score(score: Score) -> String {
    format!("score cp {}", score)
}
