//! Tokenize movetext and cut it after a number of half-moves.
//!
//! Movetext is split on ASCII whitespace. Comments in braces and
//! variations in parentheses between tokens are skipped entirely, and
//! variations may nest. Every remaining token is classified:
//!
//! * tokens containing a `.` are move numbers (`12.`, `12...`),
//! * annotation glyphs (`!?`, `$14`) are [`Nag`]s,
//! * `1-0`, `0-1`, `1/2-1/2` and `*` are game termination markers,
//! * everything else is a half-move.
//!
//! Only half-moves are counted.
//!
//! # Examples
//!
//! ```
//! use chessdb::movetext::{TokenKind, Tokens};
//!
//! let kinds: Vec<_> = Tokens::new("1. e4 {best by test} e5 (1... c5) 2. Nf3 !? 1-0")
//!     .map(|token| token.kind)
//!     .collect();
//!
//! assert_eq!(kinds.iter().filter(|kind| **kind == TokenKind::HalfMove).count(), 3);
//! assert_eq!(kinds.last(), Some(&TokenKind::Outcome));
//! ```

use std::iter::FusedIterator;

use crate::errors::{Error, Result};

/// A numeric annotation glyph like `?`, `!!` or `$42`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Nag(pub u8);

impl Nag {
    /// Reads a glyph (`!`, `?`, `!!`, `??`, `!?`, `?!`) or a numeric
    /// annotation from `$0` to `$255`.
    ///
    /// ```
    /// use chessdb::movetext::Nag;
    ///
    /// assert_eq!(Nag::from_ascii(b"??"), Some(Nag(4)));
    /// assert_eq!(Nag::from_ascii(b"$24"), Some(Nag(24)));
    /// assert_eq!(Nag::from_ascii(b"e4"), None);
    /// ```
    pub fn from_ascii(s: &[u8]) -> Option<Nag> {
        let code = match s {
            b"!" => 1,
            b"?" => 2,
            b"!!" => 3,
            b"??" => 4,
            b"!?" => 5,
            b"?!" => 6,
            [b'$', digits @ ..] if !digits.is_empty() => btoi::btou(digits).ok()?,
            _ => return None,
        };
        Some(Nag(code))
    }
}

/// What a movetext token stands for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    MoveNumber,
    HalfMove,
    Nag(Nag),
    Outcome,
}

/// A token of movetext, borrowing its literal text.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn is_half_move(&self) -> bool {
        self.kind == TokenKind::HalfMove
    }

    /// The move written in this token, if any. A move number may carry the
    /// move it numbers, as in `1.e4` or `12...Nf6`.
    pub fn san(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::HalfMove => Some(self.text),
            TokenKind::MoveNumber => {
                let san = self
                    .text
                    .trim_start_matches(|ch: char| ch.is_ascii_digit() || ch == '.');
                (!san.is_empty()).then_some(san)
            }
            TokenKind::Nag(_) | TokenKind::Outcome => None,
        }
    }
}

fn classify(token: &str) -> TokenKind {
    if token.contains('.') {
        TokenKind::MoveNumber
    } else if let Some(nag) = Nag::from_ascii(token.as_bytes()) {
        TokenKind::Nag(nag)
    } else if matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*") {
        TokenKind::Outcome
    } else {
        TokenKind::HalfMove
    }
}

/// Iterator over the tokens of movetext, skipping comments and variations.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    pub fn new(movetext: &'a str) -> Tokens<'a> {
        Tokens { rest: movetext }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.rest = skip_spans(self.rest);
        if self.rest.is_empty() {
            return None;
        }

        let end = self
            .rest
            .bytes()
            .position(|ch| ch.is_ascii_whitespace())
            .unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;

        Some(Token {
            kind: classify(text),
            text,
        })
    }
}

impl FusedIterator for Tokens<'_> {}

/// Skips whitespace, comments and variations.
fn skip_spans(mut s: &str) -> &str {
    loop {
        s = s.trim_start_matches(|ch: char| ch.is_ascii_whitespace());
        s = match s.as_bytes().first() {
            Some(b'{') => after_comment(&s[1..]),
            Some(b'(') => after_variation(&s[1..]),
            _ => return s,
        };
    }
}

/// The text after the closing brace of a comment. An unterminated comment
/// runs to the end.
fn after_comment(s: &str) -> &str {
    match memchr::memchr(b'}', s.as_bytes()) {
        Some(end) => &s[end + 1..],
        None => "",
    }
}

/// The text after the parenthesis closing a variation. Nested variations
/// and comments inside the variation are skipped with it.
fn after_variation(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut depth = 1usize;
    let mut pos = 0;

    while let Some(offset) = memchr::memchr3(b'(', b')', b'{', &bytes[pos..]) {
        let at = pos + offset;
        match bytes[at] {
            b'(' => {
                depth += 1;
                pos = at + 1;
            }
            b')' => {
                depth -= 1;
                pos = at + 1;
                if depth == 0 {
                    return &s[pos..];
                }
            }
            _ => match memchr::memchr(b'}', &bytes[at + 1..]) {
                Some(end) => pos = at + 1 + end + 1,
                None => return "",
            },
        }
    }

    ""
}

/// Number of half-moves in movetext.
pub fn count_half_moves(movetext: &str) -> usize {
    Tokens::new(movetext).filter(Token::is_half_move).count()
}

/// Keeps the tokens of `movetext` up to and including the given number of
/// half-moves, joined by single spaces.
///
/// Move numbers, glyphs and termination markers before the last kept
/// half-move are preserved. Comments and variations are dropped.
///
/// # Errors
///
/// [`Error::NotEnoughMoves`] if the movetext has fewer half-moves. No
/// partial result is returned.
///
/// # Examples
///
/// ```
/// use chessdb::movetext::truncate;
///
/// assert_eq!(truncate("1. e4 {a comment} e5 2. Nf3", 2)?, "1. e4 e5");
/// assert_eq!(truncate("1. e4 e5 2. Nf3", 0)?, "");
/// assert!(truncate("1. e4 e5", 3).is_err());
/// # Ok::<_, chessdb::Error>(())
/// ```
pub fn truncate(movetext: &str, half_moves: usize) -> Result<String> {
    let mut prefix = String::with_capacity(movetext.len());
    let mut counted = 0;

    for token in Tokens::new(movetext) {
        if counted == half_moves {
            break;
        }
        if !prefix.is_empty() {
            prefix.push(' ');
        }
        prefix.push_str(token.text);
        if token.is_half_move() {
            counted += 1;
        }
    }

    if counted < half_moves {
        return Err(Error::NotEnoughMoves {
            requested: half_moves,
            available: counted,
            game: movetext.to_owned(),
        });
    }

    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(movetext: &str) -> Vec<&str> {
        Tokens::new(movetext).map(|token| token.text).collect()
    }

    #[test]
    fn test_nag() {
        assert_eq!(Nag::from_ascii(b"$1"), Some(Nag(1)));
        assert_eq!(Nag::from_ascii(b"$123"), Some(Nag(123)));
        assert_eq!(Nag::from_ascii(b"$1234"), None);
        assert_eq!(Nag::from_ascii(b"$"), None);
        assert_eq!(Nag::from_ascii(b"!?"), Some(Nag(5)));
        assert_eq!(Nag::from_ascii(b"e4"), None);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("12."), TokenKind::MoveNumber);
        assert_eq!(classify("12..."), TokenKind::MoveNumber);
        assert_eq!(classify("1...e5"), TokenKind::MoveNumber);
        assert_eq!(classify("Nf3+"), TokenKind::HalfMove);
        assert_eq!(classify("O-O-O"), TokenKind::HalfMove);
        assert_eq!(classify("e8=Q#"), TokenKind::HalfMove);
        assert_eq!(classify("$3"), TokenKind::Nag(Nag(3)));
        assert_eq!(classify("1/2-1/2"), TokenKind::Outcome);
        assert_eq!(classify("*"), TokenKind::Outcome);
    }

    #[test]
    fn test_san() {
        let sans: Vec<_> = Tokens::new("1.e4 e5 2. Nf3 1...Nc6 $1 12... 1-0")
            .filter_map(|token| token.san())
            .collect();
        assert_eq!(sans, ["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_tokens_skip_spans() {
        assert_eq!(texts("1. e4 {a comment} e5 2. Nf3"), ["1.", "e4", "e5", "2.", "Nf3"]);
        assert_eq!(texts("1. {opening} (1. d4 d5) {two} e4"), ["1.", "e4"]);
        assert_eq!(texts("{leading} 1. e4"), ["1.", "e4"]);
        assert_eq!(
            texts("1. e4 e5 (1... c5 2. Nf3 (2. c3 {the (Alapin)}) d6) 2. Nf3"),
            ["1.", "e4", "e5", "2.", "Nf3"]
        );
        assert_eq!(texts("1. e4\te5\n2. Nf3   "), ["1.", "e4", "e5", "2.", "Nf3"]);
        assert_eq!(texts("1. e4 {unterminated e5 2. Nf3"), ["1.", "e4"]);
        assert_eq!(texts("1. e4 (1. d4 d5 2. c4"), ["1.", "e4"]);
        assert!(texts("   ").is_empty());
    }

    #[test]
    fn test_count() {
        assert_eq!(count_half_moves(""), 0);
        assert_eq!(count_half_moves("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"), 6);
        assert_eq!(count_half_moves("1. e4! e5 $2 2. Nf3 {x} Nc6 1-0"), 4);
    }

    #[test]
    fn test_truncate() {
        let game = "1. e4 e5 2. Nf3 Nc6 3. Bb5";
        assert_eq!(truncate(game, 0).unwrap(), "");
        assert_eq!(truncate(game, 1).unwrap(), "1. e4");
        assert_eq!(truncate(game, 2).unwrap(), "1. e4 e5");
        assert_eq!(truncate(game, 3).unwrap(), "1. e4 e5 2. Nf3");
        assert_eq!(truncate(game, 5).unwrap(), game);
        assert!(matches!(
            truncate(game, 6),
            Err(Error::NotEnoughMoves {
                requested: 6,
                available: 5,
                ..
            })
        ));
        assert!(truncate(game, usize::MAX).is_err());
    }

    #[test]
    fn test_truncate_drops_comments() {
        assert_eq!(truncate("1. e4 {a comment} e5 2. Nf3", 2).unwrap(), "1. e4 e5");
        assert_eq!(truncate("1. {first} {second} (1. d4) e4 e5", 1).unwrap(), "1. e4");
        assert_eq!(truncate("1. e4 e5   \n", 2).unwrap(), "1. e4 e5");
    }

    #[test]
    fn test_truncate_keeps_glyphs() {
        assert_eq!(truncate("1. e4 !! e5 ?? 2. Nf3", 2).unwrap(), "1. e4 !! e5");
        assert_eq!(truncate("1. e4 e5 1-0", 2).unwrap(), "1. e4 e5");
        assert!(truncate("1. e4 e5 1-0", 3).is_err());
    }

    #[test]
    fn test_truncate_monotonic() {
        let game = "1. d4 {queen pawn} d5 2. c4 (2. Nf3) e6 3. Nc3 Nf6 4. Bg5 Be7";
        let total = count_half_moves(game);
        assert_eq!(total, 8);
        for i in 0..=total {
            let shorter = truncate(game, i).unwrap();
            for j in i..=total {
                let longer = truncate(game, j).unwrap();
                let shorter_tokens: Vec<_> = shorter.split_whitespace().collect();
                let longer_tokens: Vec<_> = longer.split_whitespace().collect();
                assert_eq!(shorter_tokens[..], longer_tokens[..shorter_tokens.len()]);
            }
        }
    }
}
