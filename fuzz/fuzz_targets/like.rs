#![no_main]

use chessdb::pattern::like;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (text, pattern) = data;
    let _ = like(text, pattern);
    assert!(like(text, "%"));
    if !pattern.contains(['%', '_', '\\']) {
        assert_eq!(like(text, pattern), text == pattern);
    }
});
