//! Parse, validate and write Forsyth-Edwards-Notation.
//!
//! # Examples
//!
//! ```
//! use chessdb::fen::{Color, Fen};
//!
//! let fen: Fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".parse()?;
//! assert_eq!(fen.turn, Color::Black);
//! assert_eq!(fen.board.as_str(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
//! assert_eq!(fen.to_string(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
//! # Ok::<_, chessdb::Error>(())
//! ```
//!
//! Validation happens before parsing and reports the offending field:
//!
//! ```
//! use chessdb::{FenField, fen};
//!
//! assert!(fen::is_valid("8/8/8/8/8/8/8/8 w - - 0 1"));
//! assert_eq!(fen::validate("8/8/8/8/8/8/8 w - - 0 1"), Err(FenField::Board));
//! assert_eq!(fen::validate("8/8/8/8/8/8/8/8 x - - 0 1"), Err(FenField::Turn));
//! ```

use std::{fmt, num::NonZeroU32, str::FromStr};

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::errors::{Error, FenField, Result};

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const STARTING_BOARD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Side to move.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn from_char(ch: char) -> Option<Color> {
        match ch {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    fn from_ascii(s: &[u8]) -> Option<Color> {
        match s {
            [ch] => Color::from_char(char::from(*ch)),
            _ => None,
        }
    }

    pub const fn char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

bitflags! {
    /// Castling rights.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct Castles: u8 {
        const WHITE_KINGSIDE = 1;
        const WHITE_QUEENSIDE = 2;
        const BLACK_KINGSIDE = 4;
        const BLACK_QUEENSIDE = 8;
    }
}

/// Castling symbols in the only order FEN allows them.
const CASTLING_SYMBOLS: [(u8, Castles); 4] = [
    (b'K', Castles::WHITE_KINGSIDE),
    (b'Q', Castles::WHITE_QUEENSIDE),
    (b'k', Castles::BLACK_KINGSIDE),
    (b'q', Castles::BLACK_QUEENSIDE),
];

impl Castles {
    /// Parses `-` or an ordered, duplicate free subset of `KQkq`.
    pub fn from_ascii(s: &[u8]) -> Option<Castles> {
        if s == b"-" {
            return Some(Castles::empty());
        }
        if s.is_empty() {
            return None;
        }

        let mut castles = Castles::empty();
        let mut next = 0;
        for &ch in s {
            let offset = CASTLING_SYMBOLS[next..]
                .iter()
                .position(|&(symbol, _)| symbol == ch)?;
            castles |= CASTLING_SYMBOLS[next + offset].1;
            next += offset + 1;
        }
        Some(castles)
    }
}

impl fmt::Display for Castles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (symbol, flag) in CASTLING_SYMBOLS {
            if self.contains(flag) {
                write!(f, "{}", char::from(symbol))?;
            }
        }
        Ok(())
    }
}

/// A square like `e3`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn from_ascii(s: &[u8]) -> Option<Square> {
        match *s {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Some(Square {
                file: file - b'a',
                rank: rank - b'1',
            }),
            _ => None,
        }
    }

    pub const fn file(self) -> u8 {
        self.file
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Whether a pawn can be captured en passant behind this square,
    /// i.e. the square is on the third or sixth rank.
    pub const fn is_en_passant_target(self) -> bool {
        self.rank == 2 || self.rank == 5
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.file),
            char::from(b'1' + self.rank)
        )
    }
}

/// The board layout field of a FEN, like
/// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
///
/// This is also the key type of the position index: two positions share a
/// key iff their piece placement is identical.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Board(String);

impl Board {
    /// Parses and validates a board layout.
    pub fn from_ascii(s: &[u8]) -> Option<Board> {
        if board_is_valid(s) {
            // Validated boards are pure ASCII.
            std::str::from_utf8(s).ok().map(|s| Board(s.to_owned()))
        } else {
            None
        }
    }

    pub fn starting() -> Board {
        Board(STARTING_BOARD.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The eight rank groups, from the eighth rank down to the first.
    pub fn ranks(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Board> {
        Board::from_ascii(s.as_bytes()).ok_or_else(|| Error::InvalidFen {
            field: FenField::Board,
            input: s.to_owned(),
        })
    }
}

fn board_is_valid(s: &[u8]) -> bool {
    let mut ranks: ArrayVec<&[u8], 8> = ArrayVec::new();
    for rank in s.split(|&ch| ch == b'/') {
        if ranks.try_push(rank).is_err() {
            return false;
        }
    }
    ranks.is_full() && ranks.iter().all(|rank| rank_width(rank) == Some(8))
}

/// Number of squares described by a rank group, or `None` if it contains
/// a character outside the piece and digit alphabet or runs past 8 squares.
fn rank_width(rank: &[u8]) -> Option<u8> {
    let mut width = 0;
    for &ch in rank {
        width += match ch {
            b'1'..=b'8' => ch - b'0',
            b'K' | b'Q' | b'R' | b'B' | b'N' | b'P' | b'k' | b'q' | b'r' | b'b' | b'n' | b'p' => 1,
            _ => return None,
        };
        if width > 8 {
            return None;
        }
    }
    Some(width)
}

fn is_digits(s: &[u8]) -> bool {
    !s.is_empty() && s.iter().all(u8::is_ascii_digit)
}

fn parse_clock(s: &[u8]) -> Option<u32> {
    if is_digits(s) {
        btoi::btou(s).ok()
    } else {
        None
    }
}

/// Splits a record into exactly six whitespace separated fields.
fn split_fields(fen: &[u8]) -> Option<[&[u8]; 6]> {
    let mut fields: ArrayVec<&[u8], 6> = ArrayVec::new();
    for field in fen
        .split(u8::is_ascii_whitespace)
        .filter(|field| !field.is_empty())
    {
        fields.try_push(field).ok()?;
    }
    fields.into_inner().ok()
}

/// Checks the structure of a FEN record, returning the first field that is
/// not well formed.
pub fn validate(fen: &str) -> std::result::Result<(), FenField> {
    validate_ascii(fen.as_bytes())
}

/// Whether [`validate`] accepts the record.
pub fn is_valid(fen: &str) -> bool {
    validate(fen).is_ok()
}

fn validate_ascii(fen: &[u8]) -> std::result::Result<(), FenField> {
    let [board, turn, castling, ep_square, halfmoves, fullmoves] =
        split_fields(fen).ok_or(FenField::FieldCount)?;

    if !board_is_valid(board) {
        return Err(FenField::Board);
    }
    if Color::from_ascii(turn).is_none() {
        return Err(FenField::Turn);
    }
    if Castles::from_ascii(castling).is_none() {
        return Err(FenField::Castling);
    }
    if ep_square != b"-"
        && !Square::from_ascii(ep_square).is_some_and(Square::is_en_passant_target)
    {
        return Err(FenField::EnPassant);
    }
    if !is_digits(halfmoves) {
        return Err(FenField::HalfmoveClock);
    }
    if !is_digits(fullmoves) || fullmoves.iter().all(|&ch| ch == b'0') {
        return Err(FenField::Fullmoves);
    }
    Ok(())
}

/// A parsed FEN record.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Fen {
    pub board: Board,
    pub turn: Color,
    pub castles: Castles,
    pub ep_square: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmoves: NonZeroU32,
}

impl Default for Fen {
    fn default() -> Fen {
        Fen {
            board: Board::starting(),
            turn: Color::White,
            castles: Castles::all(),
            ep_square: None,
            halfmove_clock: 0,
            fullmoves: NonZeroU32::MIN,
        }
    }
}

impl Fen {
    /// The standard starting position.
    pub fn starting() -> Fen {
        Fen::default()
    }

    /// Validates and parses a FEN record.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedFen`] if the record does not split into six
    /// fields or a clock is not an unsigned integer that fits in `u32`,
    /// [`Error::InvalidFen`] if another field fails [`validate`] or the
    /// fullmove number is zero.
    pub fn from_ascii(fen: &[u8]) -> Result<Fen> {
        let malformed = || Error::MalformedFen {
            input: String::from_utf8_lossy(fen).into_owned(),
        };

        let [.., halfmoves, fullmoves] = split_fields(fen).ok_or_else(malformed)?;
        if parse_clock(halfmoves).is_none() || parse_clock(fullmoves).is_none() {
            return Err(malformed());
        }

        validate_ascii(fen).map_err(|field| Error::InvalidFen {
            field,
            input: String::from_utf8_lossy(fen).into_owned(),
        })?;
        Fen::parse_fields(fen).ok_or_else(malformed)
    }

    fn parse_fields(fen: &[u8]) -> Option<Fen> {
        let [board, turn, castling, ep_square, halfmoves, fullmoves] = split_fields(fen)?;
        Some(Fen {
            board: Board::from_ascii(board)?,
            turn: Color::from_ascii(turn)?,
            castles: Castles::from_ascii(castling)?,
            ep_square: match ep_square {
                b"-" => None,
                square => Some(Square::from_ascii(square)?),
            },
            halfmove_clock: parse_clock(halfmoves)?,
            fullmoves: NonZeroU32::new(parse_clock(fullmoves)?)?,
        })
    }
}

impl FromStr for Fen {
    type Err = Error;

    fn from_str(fen: &str) -> Result<Fen> {
        Fen::from_ascii(fen.as_bytes())
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ", self.board, self.turn, self.castles)?;
        match self.ep_square {
            Some(square) => write!(f, "{square}")?,
            None => f.write_str("-")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmoves)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Fen {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Fen {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Fen, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Board {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Board {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Board, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
