use chessdb::{Fen, Game, ops, positions::Positions, resolve::ShakmatyResolver};

struct Record {
    game: Game,
    half_moves: usize,
    fen: String,
}

fn records() -> Vec<Record> {
    let mut reader = csv::Reader::from_path("tests/data/games.csv").expect("reader");

    reader
        .records()
        .map(|line| {
            let record = line.expect("record");
            Record {
                game: record
                    .get(0)
                    .expect("game field")
                    .parse()
                    .expect("valid game"),
                half_moves: record
                    .get(1)
                    .expect("half_moves field")
                    .parse()
                    .expect("valid count"),
                fen: record.get(2).expect("fen field").to_owned(),
            }
        })
        .collect()
}

#[test]
fn test_final_positions() {
    for Record {
        game,
        half_moves,
        fen,
    } in records()
    {
        assert_eq!(game.half_moves(), half_moves, "{game}");
        assert_eq!(
            ops::board_state(&game, half_moves, &ShakmatyResolver)
                .expect("resolvable")
                .to_string(),
            fen,
            "{game}"
        );
    }
}

#[test]
fn test_truncation_boundary() {
    for Record {
        game, half_moves, ..
    } in records()
    {
        assert_eq!(game.truncate(half_moves).expect("in range").half_moves(), half_moves);
        assert!(game
            .truncate(half_moves + 1)
            .expect_err("out of range")
            .is_not_enough_moves());
    }
}

#[test]
fn test_position_sequence() {
    for Record {
        game,
        half_moves,
        fen,
    } in records()
    {
        let positions = Positions::new(&game, &ShakmatyResolver)
            .collect::<Result<Vec<Fen>, _>>()
            .expect("resolvable");

        assert_eq!(positions.len(), half_moves + 1, "{game}");
        assert_eq!(positions[0], Fen::starting());
        assert_eq!(positions.last().map(Fen::to_string), Some(fen));

        for (k, position) in positions.iter().enumerate() {
            assert!(ops::has_board(&game, position, k, &ShakmatyResolver).expect("resolvable"));
            assert!(ops::position_occurs(&game, position, &ShakmatyResolver).expect("resolvable"));
        }
    }
}

#[test]
fn test_fen_roundtrip() {
    for Record { fen, .. } in records() {
        let parsed: Fen = fen.parse().expect("valid fen");
        assert_eq!(parsed.to_string(), fen);
        assert_eq!(fen.parse::<Fen>().expect("valid fen"), parsed);
    }
}
