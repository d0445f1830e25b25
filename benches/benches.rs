use std::hint::black_box;

use chessdb::{
    Fen, Game,
    index::{self, PositionIndex},
    movetext,
    resolve::{Resolve, ShakmatyResolver},
};
use criterion::{Criterion, criterion_group, criterion_main};

const GAME: &str = "1. e4 e5 2. Nf3 Nc6 3. Bb5 {Ruy Lopez} a6 4. Ba4 Nf6 5. O-O Be7 \
                    6. Re1 b5 7. Bb3 d6 (7... O-O 8. c3 d5) 8. c3 O-O 9. h3 Nb8 10. d4 Nbd7";

fn bench_parse_fen(c: &mut Criterion) {
    c.bench_function("parse_fen", |b| {
        b.iter(|| {
            black_box("r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3")
                .parse::<Fen>()
                .expect("valid fen")
        })
    });
}

fn bench_truncate(c: &mut Criterion) {
    c.bench_function("truncate", |b| {
        b.iter(|| movetext::truncate(black_box(GAME), black_box(15)).expect("long enough"))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let game: Game = GAME.parse().expect("short game");
    c.bench_function("resolve", |b| {
        b.iter(|| ShakmatyResolver.resolve(black_box(&game)).expect("legal"))
    });
}

fn bench_extract_value(c: &mut Criterion) {
    let game: Game = GAME.parse().expect("short game");
    c.bench_function("extract_value", |b| {
        b.iter(|| index::extract_value(black_box(&game), &ShakmatyResolver).expect("legal"))
    });
}

fn bench_search(c: &mut Criterion) {
    let mut index = PositionIndex::new();
    for n in 0..=20 {
        let game = GAME.parse::<Game>().and_then(|game| game.truncate(n)).expect("long enough");
        index.insert(n, game, &ShakmatyResolver).expect("legal");
    }
    let probe: Fen = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3"
        .parse()
        .expect("valid fen");

    c.bench_function("search", |b| {
        b.iter(|| index.search(black_box(&probe), &ShakmatyResolver).expect("legal"))
    });
}

criterion_group!(
    benches,
    bench_parse_fen,
    bench_truncate,
    bench_resolve,
    bench_extract_value,
    bench_search
);
criterion_main!(benches);
