#![no_main]

use chessdb::fen::{self, Fen};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(fen) = Fen::from_ascii(data) else {
        return;
    };
    let text = fen.to_string();
    assert!(fen::is_valid(&text));
    let roundtripped = Fen::from_ascii(text.as_bytes()).expect("roundtrip");
    assert_eq!(fen, roundtripped);
});
