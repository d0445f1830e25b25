#![no_main]

use chessdb::Game;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(game) = Game::new(text) else {
        return;
    };

    let total = game.half_moves();
    let mut previous = Vec::new();
    for n in 0..=total {
        let prefix = game.truncate(n).expect("within game");
        assert_eq!(prefix.half_moves(), n);

        let tokens: Vec<String> = prefix.tokens().map(|token| token.text.to_owned()).collect();
        assert_eq!(tokens[..previous.len()], previous[..]);
        previous = tokens;
    }
    assert!(game.truncate(total + 1).is_err());
});
