//! Chess games and board positions as searchable database values.
//!
//! A [`Game`] is the movetext of a game in Standard Algebraic Notation, a
//! [`Fen`] is a board snapshot in Forsyth-Edwards-Notation. Operators answer
//! questions like "does this game start with that opening?" or "does this
//! game ever reach that board?", and an inverted index key model makes the
//! latter fast.
//!
//! The rules of chess are not implemented here. Replaying moves is delegated
//! to a [`Resolve`](resolve::Resolve) implementation, by default the
//! [`ShakmatyResolver`](resolve::ShakmatyResolver).
//!
//! # Examples
//!
//! ```
//! use chessdb::{Fen, Game, ops, resolve::ShakmatyResolver};
//!
//! let game: Game = "1. e4 {king pawn} e5 2. Nf3 Nc6 3. Bb5 a6".parse()?;
//!
//! // Truncate to the first half-moves, skipping comments.
//! assert_eq!(game.truncate(3)?.as_str(), "1. e4 e5 2. Nf3");
//!
//! // The position after 5 half-moves.
//! let fen = ops::board_state(&game, 5, &ShakmatyResolver)?;
//! assert_eq!(fen.to_string(), "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3");
//!
//! // Search for a board regardless of side to move and clocks.
//! let probe: Fen = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w - - 0 1".parse()?;
//! assert!(ops::position_occurs(&game, &probe, &ShakmatyResolver)?);
//! # Ok::<_, chessdb::Error>(())
//! ```
//!
//! # Feature flags
//!
//! * `serde`: Implements [`serde::Serialize`](https://docs.rs/serde/1/serde/trait.Serialize.html)
//!   and [`serde::Deserialize`](https://docs.rs/serde/1/serde/trait.Deserialize.html) for
//!   [`Game`], [`Fen`] and [`Board`] as their text forms.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]

mod errors;

pub mod config;
pub mod fen;
pub mod game;
pub mod host;
pub mod index;
pub mod movetext;
pub mod ops;
pub mod pattern;
pub mod positions;
pub mod resolve;

pub use errors::{Error, FenField, ResolveError, Result};
pub use fen::{Board, Fen};
pub use game::Game;
