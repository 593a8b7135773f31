//! Tunable constants and engine configuration.
//!
//! Every heuristic number the evaluator uses lives in [`Weights`]. None of them
//! have a derivation; they are hand-tuned and can be overridden from a TOML
//! file, e.g.
//!
//! ```toml
//! base_depth = 2
//! seed = 7
//!
//! [weights]
//! check = 200
//! opponent_turn_multiplier = 1.0
//!
//! [weights.move_cost]
//! queen = 250
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shakmaty::Role;

use crate::error::EngineError;
use crate::types::{Interest, Score, DEFAULT_DEPTH};

/// One value per piece role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleTable {
    pub pawn: Score,
    pub knight: Score,
    pub bishop: Score,
    pub rook: Score,
    pub queen: Score,
    pub king: Score,
}

impl RoleTable {
    pub fn get(&self, role: Role) -> Score {
        match role {
            Role::Pawn => self.pawn,
            Role::Knight => self.knight,
            Role::Bishop => self.bishop,
            Role::Rook => self.rook,
            Role::Queen => self.queen,
            Role::King => self.king,
        }
    }
}

/// Extra plies granted per interest category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestBonus {
    pub none: u32,
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl InterestBonus {
    pub fn get(&self, interest: Interest) -> u32 {
        match interest {
            Interest::None => self.none,
            Interest::Low => self.low,
            Interest::Medium => self.medium,
            Interest::High => self.high,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Material value, used for captures and for the leverage ratio.
    pub piece_value: RoleTable,
    /// Subtracted whenever a piece of this role moves.
    pub move_cost: RoleTable,

    pub check: Score,
    pub checkmate: Score,
    pub draw: Score,

    pub promotion_bonus: Score,
    pub en_passant_bonus: Score,
    pub castle_bonus: Score,

    /// Knights and bishops landing on c3-f6 gain this, elsewhere lose it.
    pub center_bonus: Score,
    /// Pawns landing within two ranks of promotion gain this; pawns still on
    /// their first three ranks after moving lose it.
    pub pawn_rank_bonus: Score,

    /// Capture value multiplier on the root mover's plies. Defaults to full
    /// value: the mover's gains are already damped by ply depth, and a lower
    /// scale makes trading into a lost piece look cheap. Lower it to play
    /// more defensively.
    pub mover_capture_scale: f64,
    /// Capture value multiplier on the opponent's plies. Losing a piece
    /// counts more than winning one.
    pub opponent_capture_scale: f64,
    /// Opponent plies are negated and scaled by this.
    pub opponent_turn_multiplier: f64,

    pub interest_bonus: InterestBonus,
    /// The interest extension is only granted while this much time remains.
    pub extension_gate_ms: u64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            piece_value: RoleTable {
                pawn: 200,
                knight: 300,
                bishop: 400,
                rook: 400,
                queen: 700,
                king: 800,
            },
            move_cost: RoleTable {
                pawn: 50,
                knight: 85,
                bishop: 100,
                rook: 100,
                queen: 200,
                king: 450,
            },
            check: 150,
            checkmate: 10_000_000,
            draw: -20_000_000,
            promotion_bonus: 500,
            en_passant_bonus: 300,
            castle_bonus: 200,
            center_bonus: 20,
            pawn_rank_bonus: 15,
            mover_capture_scale: 1.0,
            opponent_capture_scale: 3.5,
            opponent_turn_multiplier: 1.25,
            interest_bonus: InterestBonus {
                none: 0,
                low: 0,
                medium: 0,
                high: 2,
            },
            extension_gate_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Plies searched before any interest extension.
    pub base_depth: u32,
    /// Pins the tie-break randomness. Entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Stop descending once this much of the move's time has been spent.
    pub hard_deadline_ms: Option<u64>,
    pub weights: Weights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_depth: DEFAULT_DEPTH,
            seed: None,
            hard_deadline_ms: None,
            weights: Weights::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// TOML accepts only signed 64-bit integers, so a seed above `i64::MAX`
    /// cannot be written out.
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
