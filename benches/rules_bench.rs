//! Rules Engine Benchmarks
//!
//! Performance benchmarks for the hot board operations using Criterion.

use chess_core::Board;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_apply_undo_cycle(c: &mut Criterion) {
    c.bench_function("apply_undo_cycle", |b| {
        b.iter(|| {
            let mut board = Board::new();
            board.apply_move("e2", "e4");
            board.apply_move("e7", "e5");
            board.apply_move("g1", "f3");
            board.undo();
            board.undo();
            board.undo();
            black_box(board.to_fen())
        })
    });
}

fn bench_legal_reply_scan(c: &mut Criterion) {
    let board = Board::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
        .expect("bench FEN is valid");

    c.bench_function("phase_with_legal_reply_scan", |b| {
        b.iter(|| black_box(board.phase()))
    });
}

fn bench_fen_round_trip(c: &mut Criterion) {
    let board = Board::new();

    c.bench_function("fen_round_trip", |b| {
        b.iter(|| {
            let fen = board.to_fen();
            black_box(Board::from_fen(&fen).expect("round-trip FEN is valid"))
        })
    });
}

criterion_group!(
    benches,
    bench_apply_undo_cycle,
    bench_legal_reply_scan,
    bench_fen_round_trip
);
criterion_main!(benches);
