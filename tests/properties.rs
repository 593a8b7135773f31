use std::thread;
use std::time::Duration;

use shakmaty::{CastlingMode, Color, Move, MoveList, Piece, Role, Square};

use lookahead::types::UNBOUNDED_MS;
use lookahead::{ChessBoard, EngineConfig, Rules, SearchContext, Searcher};

const POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
    "7k/P6p/8/8/8/8/8/K7 w - - 0 1",
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 4 4",
];

fn searcher(depth: u32, seed: u64) -> Searcher {
    let config = EngineConfig {
        base_depth: depth,
        seed: Some(seed),
        ..EngineConfig::default()
    };
    Searcher::new(&config)
}

fn uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

#[test]
fn chosen_move_is_always_legal() {
    for fen in POSITIONS {
        let mut board = ChessBoard::from_fen(fen).unwrap();
        let legal = board.legal_moves();
        for seed in 0..3 {
            // No clock: keep the interest extension out of the way
            let mv = searcher(2, seed).think(&mut board, 0);
            assert!(legal.contains(&mv), "{} is not legal in {fen}", uci(&mv));
        }
    }
}

#[test]
fn search_leaves_board_untouched() {
    for fen in POSITIONS {
        let mut board = ChessBoard::from_fen(fen).unwrap();
        let before = board.fingerprint();
        let mut s = searcher(2, 7);

        s.search(&mut board, 0);
        assert_eq!(board.fingerprint(), before, "search mutated {fen}");

        let moves = board.legal_moves();
        for mv in &moves {
            s.evaluate_move(mv, &mut board, SearchContext::root(2));
            assert_eq!(board.fingerprint(), before, "scoring {} mutated {fen}", uci(mv));
        }
    }
}

#[test]
fn takes_the_only_mate() {
    let fen = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";
    for depth in 1..=3 {
        for seed in 0..4 {
            let mut board = ChessBoard::from_fen(fen).unwrap();
            let mv = searcher(depth, seed).think(&mut board, UNBOUNDED_MS);
            assert_eq!(uci(&mv), "a1a8", "depth {depth} seed {seed}");
        }
    }
}

#[test]
fn mate_beats_a_draw_forced_on_the_reply() {
    // Every other move stalemates, or lets Kg8 reach the hundredth halfmove
    let fen = "7k/5K1p/7P/8/8/8/8/R7 w - - 98 80";
    for depth in 1..=3 {
        for seed in 0..4 {
            let mut board = ChessBoard::from_fen(fen).unwrap();
            let result = searcher(depth, seed).search(&mut board, UNBOUNDED_MS);
            let mv = result.best_move.unwrap();
            assert_eq!(uci(&mv), "a1a8", "depth {depth} seed {seed}");
            assert_eq!(result.score, -100 + 150 + 10_000_000);
        }
    }

    // The king walk is scored as the draw it allows
    let mut board = ChessBoard::from_fen(fen).unwrap();
    let walk = board.parse_uci_move("f7e6").unwrap();
    let scored = searcher(2, 0).evaluate_move(&walk, &mut board, SearchContext::root(2));
    assert!(scored.score < -10_000_000, "f7e6 scored {}", scored.score);
}

#[test]
fn prefers_a_move_that_does_not_draw() {
    // Qb6 stalemates, Qb2 does not; both are quiet queen moves
    let mut board = ChessBoard::from_fen("k7/8/2K5/8/8/8/8/1Q6 w - - 0 1").unwrap();
    let stalemate = board.parse_uci_move("b1b6").unwrap();
    let quiet = board.parse_uci_move("b1b2").unwrap();

    for seed in 0..8 {
        let mut s = searcher(1, seed);
        let best = s.select_best_move(&[stalemate, quiet], &mut board, SearchContext::root(1));
        assert_eq!(best.mv, quiet, "seed {seed}");
        let best = s.select_best_move(&[quiet, stalemate], &mut board, SearchContext::root(1));
        assert_eq!(best.mv, quiet, "seed {seed}");
    }

    for seed in 0..4 {
        let mv = searcher(1, seed).think(&mut board, 0);
        assert_ne!(mv, stalemate);
    }
}

/// Movement cost plus positional term, recomputed from the default constants.
fn expected_opening_score(mv: &Move) -> i32 {
    let to = mv.to();
    let rank = to.rank() as i32;
    let file = to.file() as i32;
    match mv.role() {
        Role::Pawn => {
            let bonus = if rank >= 5 {
                15
            } else if rank <= 2 {
                -15
            } else {
                0
            };
            -50 + bonus
        }
        Role::Knight => {
            let central = (2..=5).contains(&file) && (2..=5).contains(&rank);
            -85 + if central { 20 } else { -20 }
        }
        other => panic!("{other:?} cannot move from the start position"),
    }
}

#[test]
fn depth_one_opening_matches_hand_computed_argmax() {
    let mut board = ChessBoard::default();
    let moves = board.legal_moves();
    let best_expected = moves.iter().map(expected_opening_score).max().unwrap();
    assert_eq!(best_expected, -50);

    for seed in 0..5 {
        let result = searcher(1, seed).search(&mut board, UNBOUNDED_MS);
        let mv = result.best_move.unwrap();
        assert_eq!(result.score, best_expected);
        assert_eq!(expected_opening_score(&mv), best_expected, "{}", uci(&mv));
    }

    let mut s = searcher(1, 0);
    let evaluated = s.evaluate_all(&moves, &mut board, SearchContext::root(1));
    for e in &evaluated {
        assert_eq!(e.score, expected_opening_score(&e.mv), "{}", uci(&e.mv));
    }
}

/// Delegates to a real board while recording how deep the apply stack gets.
struct DepthProbe {
    inner: ChessBoard,
    applied: usize,
    deepest: usize,
}

impl DepthProbe {
    fn new(fen: &str) -> Self {
        Self {
            inner: ChessBoard::from_fen(fen).unwrap(),
            applied: 0,
            deepest: 0,
        }
    }
}

impl Rules for DepthProbe {
    fn legal_moves(&self) -> MoveList {
        self.inner.legal_moves()
    }

    fn apply(&mut self, mv: &Move) {
        self.inner.apply(mv);
        self.applied += 1;
        self.deepest = self.deepest.max(self.applied);
    }

    fn revert(&mut self, mv: &Move) {
        self.inner.revert(mv);
        self.applied -= 1;
    }

    fn is_in_check(&self) -> bool {
        self.inner.is_in_check()
    }

    fn is_checkmate(&self) -> bool {
        self.inner.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.inner.is_draw()
    }

    fn turn(&self) -> Color {
        self.inner.turn()
    }

    fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.inner.piece_at(sq)
    }
}

#[test]
fn interest_extension_bounds_depth() {
    // Ra8+ is a checking move, so it earns the two extra plies
    let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";

    let mut probe = DepthProbe::new(fen);
    searcher(2, 0).search(&mut probe, UNBOUNDED_MS);
    assert_eq!(probe.applied, 0);
    assert_eq!(probe.deepest, 4);

    // Below the time gate the extension is withheld
    let mut probe = DepthProbe::new(fen);
    searcher(2, 0).search(&mut probe, 1000);
    assert_eq!(probe.applied, 0);
    assert_eq!(probe.deepest, 2);
}

#[test]
fn custom_weights_change_the_choice() {
    // With castling made very attractive the engine castles at once
    let mut config = EngineConfig {
        base_depth: 1,
        seed: Some(3),
        ..EngineConfig::default()
    };
    config.weights.castle_bonus = 5000;
    let mut board = ChessBoard::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
    let mv = Searcher::new(&config).think(&mut board, 0);
    assert!(mv.is_castle(), "{}", uci(&mv));
}

/// Offers only `root_moves` at the root and sleeps before the `stall_at`-th
/// root-level apply.
struct SlowRoot {
    inner: ChessBoard,
    root_moves: Vec<Move>,
    applied: usize,
    root_applies: usize,
    stall_at: usize,
}

impl SlowRoot {
    fn new(fen: &str, root_moves: &[&str], stall_at: usize) -> Self {
        let inner = ChessBoard::from_fen(fen).unwrap();
        let root_moves = root_moves
            .iter()
            .map(|uci| inner.parse_uci_move(uci).unwrap())
            .collect();
        Self {
            inner,
            root_moves,
            applied: 0,
            root_applies: 0,
            stall_at,
        }
    }
}

impl Rules for SlowRoot {
    fn legal_moves(&self) -> MoveList {
        if self.applied == 0 {
            self.root_moves.iter().copied().collect()
        } else {
            self.inner.legal_moves()
        }
    }

    fn apply(&mut self, mv: &Move) {
        if self.applied == 0 {
            self.root_applies += 1;
            if self.root_applies == self.stall_at {
                thread::sleep(Duration::from_millis(100));
            }
        }
        self.inner.apply(mv);
        self.applied += 1;
    }

    fn revert(&mut self, mv: &Move) {
        self.inner.revert(mv);
        self.applied -= 1;
    }

    fn is_in_check(&self) -> bool {
        self.inner.is_in_check()
    }

    fn is_checkmate(&self) -> bool {
        self.inner.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.inner.is_draw()
    }

    fn turn(&self) -> Color {
        self.inner.turn()
    }

    fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.inner.piece_at(sq)
    }
}

#[test]
fn root_moves_finished_after_the_deadline_are_dropped() {
    // Qe3 is searched in full (-200 + 125 for ...d4). Qe5+ alone scores -50,
    // and 1075 once the forced king move is folded in.
    let fen = "1k6/8/8/3p4/8/8/4Q3/1K6 w - - 0 1";
    let roots = ["e2e3", "e2e5"];

    let mut board = SlowRoot::new(fen, &roots, 0);
    let result = searcher(2, 5).search(&mut board, 0);
    assert_eq!(uci(&result.best_move.unwrap()), "e2e5");
    assert_eq!(result.score, 1075);

    // Qe3 takes two root applies; the stall lands on Qe5's first
    for seed in 0..4 {
        let config = EngineConfig {
            base_depth: 2,
            seed: Some(seed),
            hard_deadline_ms: Some(50),
            ..EngineConfig::default()
        };
        let mut board = SlowRoot::new(fen, &roots, 3);
        let result = Searcher::new(&config).search(&mut board, 0);
        assert_eq!(board.applied, 0);
        assert_eq!(uci(&result.best_move.unwrap()), "e2e3", "seed {seed}");
        assert_eq!(result.score, -75);
    }
}
