//! Game rules collaborator.
//!
//! The search core only talks to the board through [`Rules`]. [`ChessBoard`]
//! implements it on top of `shakmaty`, adding an undo stack (shakmaty positions
//! are copy-make only) and a Zobrist history for repetition draws.

use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{
    Board, CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Piece, Position, Square,
};

use crate::error::EngineError;

/// Everything the search needs from the rules of the game.
///
/// `apply` and `revert` follow stack discipline: the move passed to `revert`
/// must be the most recently applied one.
pub trait Rules {
    fn legal_moves(&self) -> MoveList;
    fn apply(&mut self, mv: &Move);
    fn revert(&mut self, mv: &Move);
    fn is_in_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_draw(&self) -> bool;
    fn turn(&self) -> Color;
    fn piece_at(&self, sq: Square) -> Option<Piece>;
}

/// Applies a move for as long as the guard lives; reverts it on drop.
pub struct Applied<'a, B: Rules + ?Sized> {
    board: &'a mut B,
    mv: Move,
}

impl<'a, B: Rules + ?Sized> Applied<'a, B> {
    pub fn new(board: &'a mut B, mv: &Move) -> Self {
        board.apply(mv);
        Self { board, mv: *mv }
    }
}

impl<B: Rules + ?Sized> Deref for Applied<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.board
    }
}

impl<B: Rules + ?Sized> DerefMut for Applied<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.board
    }
}

impl<B: Rules + ?Sized> Drop for Applied<'_, B> {
    fn drop(&mut self) {
        self.board.revert(&self.mv);
    }
}

/// Cheap summary of everything `apply`/`revert` may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub hash: Zobrist64,
    pub turn: Color,
    pub halfmoves: u32,
    pub fullmoves: u32,
    pub applied: usize,
    pub history: usize,
}

/// A chess position with an explicit undo stack.
#[derive(Debug, Clone)]
pub struct ChessBoard {
    pos: Chess,
    undo: Vec<(Chess, Move)>,
    /// Hash of every position reached so far, current one last.
    history: Vec<Zobrist64>,
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl FromStr for ChessBoard {
    type Err = EngineError;

    fn from_str(fen: &str) -> Result<Self, Self::Err> {
        Self::from_fen(fen)
    }
}

impl ChessBoard {
    pub fn new(pos: Chess) -> Self {
        let hash = hash_of(&pos);
        Self {
            pos,
            undo: Vec::new(),
            history: vec![hash],
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let fen: Fen = fen.parse()?;
        let pos: Chess = fen.into_position(CastlingMode::Standard)?;
        Ok(Self::new(pos))
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    pub fn board(&self) -> &Board {
        self.pos.board()
    }

    pub fn hash(&self) -> Zobrist64 {
        hash_of(&self.pos)
    }

    /// Plays a move permanently: it becomes part of the game history and
    /// cannot be reverted.
    pub fn push_history_move(&mut self, mv: &Move) {
        assert!(self.undo.is_empty(), "history move played during a search");
        self.pos.play_unchecked(*mv);
        self.history.push(hash_of(&self.pos));
    }

    /// Finds the legal move spelled `text` in UCI notation (e.g. `e2e4`, `a7a8q`).
    pub fn parse_uci_move(&self, text: &str) -> Result<Move, EngineError> {
        self.pos
            .legal_moves()
            .into_iter()
            .find(|mv| mv.to_uci(CastlingMode::Standard).to_string() == text)
            .ok_or_else(|| EngineError::IllegalMove(text.to_string()))
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            hash: self.hash(),
            turn: self.pos.turn(),
            halfmoves: self.pos.halfmoves(),
            fullmoves: self.pos.fullmoves().get(),
            applied: self.undo.len(),
            history: self.history.len(),
        }
    }

    fn is_repetition(&self) -> bool {
        match self.history.split_last() {
            Some((current, earlier)) => earlier.contains(current),
            None => false,
        }
    }
}

impl Rules for ChessBoard {
    fn legal_moves(&self) -> MoveList {
        self.pos.legal_moves()
    }

    fn apply(&mut self, mv: &Move) {
        self.undo.push((self.pos.clone(), *mv));
        self.pos.play_unchecked(*mv);
        self.history.push(hash_of(&self.pos));
    }

    fn revert(&mut self, mv: &Move) {
        let (prev, applied) = self.undo.pop().expect("revert without a matching apply");
        assert_eq!(applied, *mv, "moves reverted out of order");
        self.pos = prev;
        self.history.pop();
    }

    fn is_in_check(&self) -> bool {
        self.pos.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.pos.is_stalemate()
            || self.pos.is_insufficient_material()
            || self.pos.halfmoves() >= 100
            || self.is_repetition()
    }

    fn turn(&self) -> Color {
        self.pos.turn()
    }

    fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.pos.board().piece_at(sq)
    }
}

fn hash_of(pos: &Chess) -> Zobrist64 {
    pos.zobrist_hash(EnPassantMode::Legal)
}
