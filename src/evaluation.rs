use shakmaty::{Color, Move, Role, Square};

use crate::board::{Applied, Rules};
use crate::params::Weights;
use crate::types::{Interest, Perspective, Score};

/// Unscaled score of a single move, before its subtree is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveScore {
    pub raw: Score,
    /// The move ends the game in a draw. Kept out of `raw` because a draw is
    /// bad for the root mover whichever side reaches it.
    pub draw: bool,
    pub interest: Interest,
}

/// Sums the heuristic terms for `mv`, which must be legal on `board`.
///
/// The board is left exactly as it was found.
pub fn score_move<B: Rules + ?Sized>(
    mv: &Move,
    board: &mut B,
    perspective: Perspective,
    weights: &Weights,
) -> MoveScore {
    let mover = board.turn();
    let (capture, mut interest) = capture_term(mv, perspective, weights);

    let mut raw = capture - weights.move_cost.get(mv.role());
    raw += positional_term(mv, mover, weights);
    raw += special_term(mv, weights);

    let state = game_state_term(mv, board, weights);
    raw += state.score;
    if state.gives_check {
        interest = Interest::High;
    }

    MoveScore {
        raw,
        draw: state.draw,
        interest,
    }
}

/// Score of a move at ply `depth`, in the root mover's frame.
///
/// The heuristic part goes through [`scale_for_perspective`]. A draw adds
/// `weights.draw` unscaled and never negated, so it stays below any
/// continuation that is not lost.
pub fn root_frame_score(scored: &MoveScore, depth: u32, perspective: Perspective, weights: &Weights) -> Score {
    let score = scale_for_perspective(scored.raw, depth, perspective, weights);
    if scored.draw {
        score.saturating_add(weights.draw)
    } else {
        score
    }
}

/// Scales a raw score into the root mover's frame for ply `depth`.
///
/// Mover plies are damped by depth. Opponent plies are amplified by depth,
/// negated, and weighted by `opponent_turn_multiplier`.
pub fn scale_for_perspective(raw: Score, depth: u32, perspective: Perspective, weights: &Weights) -> Score {
    let depth = depth.max(1) as i64;
    match perspective {
        Perspective::Mover => (raw as i64 / depth) as Score,
        Perspective::Opponent => {
            ((raw as i64 * depth) as f64 * -weights.opponent_turn_multiplier) as Score
        }
    }
}

fn capture_term(mv: &Move, perspective: Perspective, weights: &Weights) -> (Score, Interest) {
    let Some(victim) = mv.capture() else {
        return (0, Interest::None);
    };

    let interest = match victim {
        Role::Pawn => Interest::Low,
        Role::King => Interest::None,
        _ => Interest::Medium,
    };
    let scale = match perspective {
        Perspective::Mover => weights.mover_capture_scale,
        Perspective::Opponent => weights.opponent_capture_scale,
    };

    let value = weights.piece_value.get(victim) as f64 * scale;
    (value as Score, interest)
}

fn positional_term(mv: &Move, mover: Color, weights: &Weights) -> Score {
    let to = mv.to();
    match mv.role() {
        Role::Knight | Role::Bishop => {
            if is_central(to) {
                weights.center_bonus
            } else {
                -weights.center_bonus
            }
        }
        Role::Pawn => match relative_rank(to, mover) {
            5.. => weights.pawn_rank_bonus,
            ..=2 => -weights.pawn_rank_bonus,
            _ => 0,
        },
        _ => 0,
    }
}

fn special_term(mv: &Move, weights: &Weights) -> Score {
    let mut score = 0;
    if mv.is_promotion() {
        score += weights.promotion_bonus;
    }
    if mv.is_en_passant() {
        score += weights.en_passant_bonus;
    }
    if mv.is_castle() {
        score += weights.castle_bonus;
    }
    score
}

struct GameState {
    score: Score,
    gives_check: bool,
    draw: bool,
}

/// Looks at the position after `mv`. Check and mate go into `score`.
fn game_state_term<B: Rules + ?Sized>(mv: &Move, board: &mut B, weights: &Weights) -> GameState {
    let after = Applied::new(board, mv);

    let mut score = 0;
    let gives_check = after.is_in_check();
    if gives_check {
        score += weights.check;
    }
    if after.is_checkmate() {
        score += weights.checkmate;
    }
    GameState {
        score,
        gives_check,
        draw: after.is_draw(),
    }
}

/// c3-f6 block.
fn is_central(sq: Square) -> bool {
    let file = sq.file() as u32;
    let rank = sq.rank() as u32;
    (2..=5).contains(&file) && (2..=5).contains(&rank)
}

/// Rank index counted from `color`'s own back rank.
fn relative_rank(sq: Square, color: Color) -> u32 {
    let rank = sq.rank() as u32;
    match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    }
}

/// Total piece value `color` has on the board, kings included.
pub fn material<B: Rules + ?Sized>(board: &B, color: Color, weights: &Weights) -> Score {
    Square::ALL
        .into_iter()
        .filter_map(|sq| board.piece_at(sq))
        .filter(|piece| piece.color == color)
        .map(|piece| weights.piece_value.get(piece.role))
        .sum()
}

/// Side to move's material over the opponent's.
pub fn leverage<B: Rules + ?Sized>(board: &B, weights: &Weights) -> f64 {
    let mover = board.turn();
    let own = material(board, mover, weights);
    let theirs = material(board, !mover, weights).max(1);
    own as f64 / theirs as f64
}
