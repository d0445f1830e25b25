//! Entry points as a database host calls them.
//!
//! Every argument may be SQL `NULL`, which is passed as `None`, and
//! half-move counts arrive as signed integers. A missing argument is
//! reported as [`Error::NullArgument`] naming the function and argument
//! position, except in [`Extension::san_eq`], which answers `false`.
//!
//! # Examples
//!
//! ```
//! use chessdb::{Error, host::Extension, resolve::ShakmatyResolver};
//!
//! let ext = Extension::new(ShakmatyResolver);
//! let game = ext.san_in(Some("1. e4 e5 2. Nf3"))?;
//!
//! let fen = ext.get_board_state(Some(&game), Some(1))?;
//! assert_eq!(ext.fen_out(Some(&fen))?, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
//!
//! assert!(matches!(
//!     ext.get_first_moves(Some(&game), None),
//!     Err(Error::NullArgument { function: "get_first_moves", position: 1 })
//! ));
//! assert!(!ext.san_eq(Some(&game), None));
//! # Ok::<_, chessdb::Error>(())
//! ```

use std::cmp::Ordering;

use once_cell::sync::Lazy;

use crate::{
    errors::{Error, Result},
    fen::{Board, Fen},
    game::Game,
    index::{self, Consistency, Query, Ternary},
    ops,
    resolve::{Resolve, ShakmatyResolver, Supervised},
};

/// The resolver behind [`Extension::shared`].
pub type SharedResolver = Supervised<fn() -> ShakmatyResolver>;

static SHARED: Lazy<Extension<SharedResolver>> = Lazy::new(|| {
    Extension::new(Supervised::new(
        ShakmatyResolver::default as fn() -> ShakmatyResolver,
    ))
});

fn required<T>(arg: Option<T>, function: &'static str, position: usize) -> Result<T> {
    arg.ok_or(Error::NullArgument { function, position })
}

fn half_moves(count: i32, function: &'static str) -> Result<usize> {
    usize::try_from(count).map_err(|_| Error::NegativeHalfMoves { function, count })
}

fn ordering_to_i32(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// The functions of the extension, bound to a resolver.
#[derive(Debug, Clone, Default)]
pub struct Extension<R> {
    resolver: R,
}

impl Extension<SharedResolver> {
    /// A process wide instance backed by one supervised resolver worker
    /// with the default [`Config`](crate::config::Config).
    pub fn shared() -> &'static Extension<SharedResolver> {
        &SHARED
    }
}

impl<R: Resolve> Extension<R> {
    pub fn new(resolver: R) -> Extension<R> {
        Extension { resolver }
    }

    pub fn san_in(&self, text: Option<&str>) -> Result<Game> {
        required(text, "san_in", 0)?.parse()
    }

    pub fn san_out(&self, game: Option<&Game>) -> Result<String> {
        Ok(required(game, "san_out", 0)?.to_string())
    }

    pub fn fen_in(&self, text: Option<&str>) -> Result<Fen> {
        required(text, "fen_in", 0)?.parse()
    }

    pub fn fen_out(&self, fen: Option<&Fen>) -> Result<String> {
        Ok(required(fen, "fen_out", 0)?.to_string())
    }

    pub fn has_opening(&self, game: Option<&Game>, opening: Option<&Game>) -> Result<bool> {
        let game = required(game, "has_opening", 0)?;
        let opening = required(opening, "has_opening", 1)?;
        ops::has_opening(game, opening)
    }

    pub fn get_first_moves(&self, game: Option<&Game>, n: Option<i32>) -> Result<Game> {
        let game = required(game, "get_first_moves", 0)?;
        let n = half_moves(required(n, "get_first_moves", 1)?, "get_first_moves")?;
        ops::first_moves(game, n)
    }

    pub fn get_board_state(&self, game: Option<&Game>, n: Option<i32>) -> Result<Fen> {
        let game = required(game, "get_board_state", 0)?;
        let n = half_moves(required(n, "get_board_state", 1)?, "get_board_state")?;
        ops::board_state(game, n, &self.resolver)
    }

    pub fn has_board(&self, game: Option<&Game>, fen: Option<&Fen>, n: Option<i32>) -> Result<bool> {
        let game = required(game, "has_board", 0)?;
        let fen = required(fen, "has_board", 1)?;
        let n = half_moves(required(n, "has_board", 2)?, "has_board")?;
        ops::has_board(game, fen, n, &self.resolver)
    }

    fn compare(&self, function: &'static str, a: Option<&Game>, b: Option<&Game>) -> Result<Ordering> {
        Ok(required(a, function, 0)?.cmp(required(b, function, 1)?))
    }

    pub fn san_lt(&self, a: Option<&Game>, b: Option<&Game>) -> Result<bool> {
        Ok(self.compare("san_lt", a, b)?.is_lt())
    }

    pub fn san_lt_eq(&self, a: Option<&Game>, b: Option<&Game>) -> Result<bool> {
        Ok(self.compare("san_lt_eq", a, b)?.is_le())
    }

    /// Equality, `false` if either side is missing.
    pub fn san_eq(&self, a: Option<&Game>, b: Option<&Game>) -> bool {
        matches!((a, b), (Some(a), Some(b)) if a == b)
    }

    pub fn san_gt_eq(&self, a: Option<&Game>, b: Option<&Game>) -> Result<bool> {
        Ok(self.compare("san_gt_eq", a, b)?.is_ge())
    }

    pub fn san_gt(&self, a: Option<&Game>, b: Option<&Game>) -> Result<bool> {
        Ok(self.compare("san_gt", a, b)?.is_gt())
    }

    pub fn san_cmp(&self, a: Option<&Game>, b: Option<&Game>) -> Result<i32> {
        self.compare("san_cmp", a, b).map(ordering_to_i32)
    }

    pub fn san_like(&self, game: Option<&Game>, pattern: Option<&str>) -> Result<bool> {
        let game = required(game, "san_like", 0)?;
        Ok(game.like(required(pattern, "san_like", 1)?))
    }

    pub fn san_not_like(&self, game: Option<&Game>, pattern: Option<&str>) -> Result<bool> {
        let game = required(game, "san_not_like", 0)?;
        Ok(game.not_like(required(pattern, "san_not_like", 1)?))
    }

    /// Every position of the game as FEN text.
    pub fn fens_from_san(&self, game: Option<&Game>) -> Result<Vec<String>> {
        ops::all_positions(required(game, "fens_from_san", 0)?, &self.resolver)
    }

    /// `game @> fen`: the game passes through the piece placement.
    pub fn has_board_fn_operator(&self, game: Option<&Game>, fen: Option<&Fen>) -> Result<bool> {
        let game = required(game, "has_board_fn_operator", 0)?;
        let fen = required(fen, "has_board_fn_operator", 1)?;
        ops::position_occurs(game, fen, &self.resolver)
    }

    /// `fen <@ game`: the piece placement occurs in the game.
    pub fn fen_in_san_eq(&self, fen: Option<&Fen>, game: Option<&Game>) -> Result<bool> {
        let fen = required(fen, "fen_in_san_eq", 0)?;
        let game = required(game, "fen_in_san_eq", 1)?;
        ops::board_in_game(fen, game, &self.resolver)
    }

    pub fn gin_compare(&self, a: Option<&Board>, b: Option<&Board>) -> Result<i32> {
        let a = required(a, "gin_compare", 0)?;
        let b = required(b, "gin_compare", 1)?;
        Ok(ordering_to_i32(index::compare(a, b)))
    }

    pub fn gin_extract_value(&self, game: Option<&Game>) -> Result<Vec<Board>> {
        index::extract_value(required(game, "gin_extract_value", 0)?, &self.resolver)
    }

    pub fn gin_extract_query(&self, fen: Option<&Fen>) -> Result<Query> {
        Ok(index::extract_query(required(fen, "gin_extract_query", 0)?))
    }

    pub fn gin_consistent(&self, check: &[bool], query: &Query, probe: &Fen) -> Consistency {
        index::consistent(check, &query.keys, &probe.board)
    }

    pub fn gin_tri_consistent(&self, check: &[Ternary], query: &Query, probe: &Fen) -> Ternary {
        index::tri_consistent(check, &query.keys, &probe.board)
    }
}
