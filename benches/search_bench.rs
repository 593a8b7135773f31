use std::str::FromStr;
use lookahead::board::{ChessBoard, Rules};
use lookahead::{EngineConfig, Searcher};
use criterion::{criterion_group, criterion_main, Criterion};

fn searcher(depth: u32) -> Searcher {
    let config = EngineConfig {
        base_depth: depth,
        seed: Some(0),
        ..EngineConfig::default()
    };
    Searcher::new(&config)
}

fn bench_search(c: &mut Criterion) {
    let mut board = ChessBoard::default();

    c.bench_function("search_depth_2_startpos", |b| {
        b.iter(|| searcher(2).search(&mut board, 0))
    });

    c.bench_function("search_depth_3_startpos", |b| {
        b.iter(|| searcher(3).search(&mut board, 0))
    });

    let mut kiwipete = ChessBoard::from_str(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
    ).unwrap();

    c.bench_function("search_depth_2_kiwipete", |b| {
        b.iter(|| searcher(2).search(&mut kiwipete, 0))
    });
}

fn bench_apply_revert(c: &mut Criterion) {
    let mut board = ChessBoard::default();
    let moves = board.legal_moves();
    c.bench_function("apply_revert_startpos", |b| {
        b.iter(|| {
            for mv in &moves {
                board.apply(mv);
                board.revert(mv);
            }
        })
    });
}

criterion_group!(benches, bench_search, bench_apply_revert);
criterion_main!(benches);
