//! Every position a game passes through.

use std::{fmt, iter::FusedIterator};

use tracing::trace;

use crate::{
    errors::{Error, Result},
    fen::{Board, Fen},
    game::Game,
    resolve::Resolve,
};

/// Iterator over the positions of a game, starting with the position
/// before the first half-move.
///
/// The position after `k` half-moves is found by resolving the game
/// truncated to `k` half-moves. Iteration ends after the last half-move.
/// If the resolver fails, the error is yielded once and iteration ends.
///
/// A clone continues from the same half-move. Use [`Positions::new`] to
/// start over.
pub struct Positions<'a, R: ?Sized> {
    game: &'a Game,
    resolver: &'a R,
    ply: usize,
    last: usize,
    failed: bool,
}

impl<'a, R: Resolve + ?Sized> Positions<'a, R> {
    pub fn new(game: &'a Game, resolver: &'a R) -> Positions<'a, R> {
        Positions {
            game,
            resolver,
            ply: 0,
            last: game.half_moves(),
            failed: false,
        }
    }

    /// Number of half-moves before the next position.
    pub fn ply(&self) -> usize {
        self.ply
    }

    fn is_done(&self) -> bool {
        self.failed || self.ply > self.last
    }
}

impl<R: ?Sized> Clone for Positions<'_, R> {
    fn clone(&self) -> Self {
        Positions {
            game: self.game,
            resolver: self.resolver,
            ply: self.ply,
            last: self.last,
            failed: self.failed,
        }
    }
}

impl<R: ?Sized> fmt::Debug for Positions<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Positions")
            .field("game", self.game)
            .field("ply", &self.ply)
            .field("last", &self.last)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<R: Resolve + ?Sized> Iterator for Positions<'_, R> {
    type Item = Result<Fen>;

    fn next(&mut self) -> Option<Result<Fen>> {
        if self.is_done() {
            return None;
        }

        let ply = self.ply;
        let prefix = match self.game.truncate(ply) {
            Ok(prefix) => prefix,
            Err(_) => {
                self.ply = self.last + 1;
                return None;
            }
        };
        self.ply += 1;

        match self.resolver.resolve(&prefix) {
            Ok(fen) => {
                trace!(ply, %fen, "extracted position");
                Some(Ok(fen))
            }
            Err(error) => {
                self.failed = true;
                Some(Err(Error::Resolution {
                    ply,
                    movetext: prefix.into_string(),
                    error,
                }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_done() {
            (0, Some(0))
        } else {
            (0, Some(self.last + 1 - self.ply))
        }
    }
}

impl<R: Resolve + ?Sized> FusedIterator for Positions<'_, R> {}

/// All positions of a game in move order.
///
/// # Errors
///
/// [`Error::Resolution`] if the resolver fails on any prefix.
///
/// # Examples
///
/// ```
/// use chessdb::{Game, positions::extract_all, resolve::ShakmatyResolver};
///
/// let game: Game = "1. e4 e5".parse()?;
/// let positions = extract_all(&game, &ShakmatyResolver)?;
/// assert_eq!(positions.len(), 3);
/// assert_eq!(positions[2].board.as_str(), "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR");
/// # Ok::<_, chessdb::Error>(())
/// ```
pub fn extract_all<R: Resolve + ?Sized>(game: &Game, resolver: &R) -> Result<Vec<Fen>> {
    Positions::new(game, resolver).collect()
}

/// Whether any position of the game has the given piece placement. Stops
/// at the first match.
///
/// # Errors
///
/// [`Error::Resolution`] if the resolver fails before a match is found.
pub fn occurs<R: Resolve + ?Sized>(game: &Game, board: &Board, resolver: &R) -> Result<bool> {
    for fen in Positions::new(game, resolver) {
        if fen?.board == *board {
            return Ok(true);
        }
    }
    Ok(false)
}
