use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{
    errors::{Error, Result},
    movetext::{self, Tokens},
    pattern,
};

/// The text of a chess game in Standard Algebraic Notation, like
/// `1. e4 e5 2. Nf3 {main line} Nc6`.
///
/// Games are ordered byte-wise by their text.
///
/// # Examples
///
/// ```
/// use chessdb::Game;
///
/// let game: Game = "1. e4 {best by test} e5 2. Nf3 Nc6".parse()?;
/// assert_eq!(game.half_moves(), 4);
///
/// let opening = game.truncate(2)?;
/// assert_eq!(opening.as_str(), "1. e4 e5");
/// assert!(game.has_opening(&opening)?);
/// # Ok::<_, chessdb::Error>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Game {
    text: String,
}

impl Game {
    /// Maximum length of game text in bytes.
    pub const MAX_LEN: usize = 999;

    /// Takes ownership of game text.
    ///
    /// # Errors
    ///
    /// [`Error::TooLong`] if the text is longer than [`Game::MAX_LEN`]
    /// bytes. The text is never clipped.
    pub fn new(text: impl Into<String>) -> Result<Game> {
        let text = text.into();
        if text.len() > Game::MAX_LEN {
            return Err(Error::TooLong {
                len: text.len(),
                max: Game::MAX_LEN,
                input: text,
            });
        }
        Ok(Game { text })
    }

    /// The game without any moves.
    pub fn empty() -> Game {
        Game::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Classified tokens, skipping comments and variations.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens::new(&self.text)
    }

    /// Total number of half-moves.
    pub fn half_moves(&self) -> usize {
        movetext::count_half_moves(&self.text)
    }

    /// The game cut after `half_moves` half-moves.
    ///
    /// # Errors
    ///
    /// [`Error::NotEnoughMoves`] if the game is shorter.
    pub fn truncate(&self, half_moves: usize) -> Result<Game> {
        // Never longer than the source.
        movetext::truncate(&self.text, half_moves).map(|text| Game { text })
    }

    /// Whether the text of this game starts with the text of `opening`.
    ///
    /// # Errors
    ///
    /// [`Error::OpeningTooLong`] if the opening is longer than the game.
    pub fn has_opening(&self, opening: &Game) -> Result<bool> {
        if opening.len() > self.len() {
            return Err(Error::OpeningTooLong {
                game: self.text.clone(),
                opening: opening.text.clone(),
            });
        }
        Ok(self.text.as_bytes().starts_with(opening.text.as_bytes()))
    }

    /// Three-way comparison as `-1`, `0` or `1`.
    pub fn compare(&self, other: &Game) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// SQL `LIKE` on the raw text. See [`pattern::like`].
    pub fn like(&self, pattern: &str) -> bool {
        pattern::like(&self.text, pattern)
    }

    pub fn not_like(&self, pattern: &str) -> bool {
        !self.like(pattern)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Game {
    type Err = Error;

    fn from_str(text: &str) -> Result<Game> {
        Game::new(text)
    }
}

impl AsRef<str> for Game {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl TryFrom<String> for Game {
    type Error = Error;

    fn try_from(text: String) -> Result<Game> {
        Game::new(text)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Game {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Game {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Game, D::Error> {
        let text = String::deserialize(deserializer)?;
        Game::new(text).map_err(serde::de::Error::custom)
    }
}
