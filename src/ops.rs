//! Query operators over games and positions.
//!
//! ```
//! use chessdb::{Fen, Game, ops, resolve::ShakmatyResolver};
//!
//! let game: Game = "1. e4 e5 2. Nf3 Nc6 3. Bb5".parse()?;
//!
//! assert!(ops::has_opening(&game, &"1. e4 e5".parse()?)?);
//! assert_eq!(ops::first_moves(&game, 3)?.as_str(), "1. e4 e5 2. Nf3");
//!
//! let fen = ops::board_state(&game, 2, &ShakmatyResolver)?;
//! assert!(ops::has_board(&game, &fen, 2, &ShakmatyResolver)?);
//! assert!(ops::position_occurs(&game, &fen, &ShakmatyResolver)?);
//! # Ok::<_, chessdb::Error>(())
//! ```

use crate::{
    errors::{Error, Result},
    fen::Fen,
    game::Game,
    positions::{self, Positions},
    resolve::Resolve,
};

/// Whether the game text starts with the opening text.
///
/// # Errors
///
/// [`Error::OpeningTooLong`] if the opening is longer than the game.
pub fn has_opening(game: &Game, opening: &Game) -> Result<bool> {
    game.has_opening(opening)
}

/// The game cut after `n` half-moves.
///
/// # Errors
///
/// [`Error::NotEnoughMoves`] if the game is shorter.
pub fn first_moves(game: &Game, n: usize) -> Result<Game> {
    game.truncate(n)
}

/// The position after `n` half-moves.
///
/// # Errors
///
/// [`Error::NotEnoughMoves`] if the game is shorter,
/// [`Error::Resolution`] if the resolver fails.
pub fn board_state<R: Resolve + ?Sized>(game: &Game, n: usize, resolver: &R) -> Result<Fen> {
    let prefix = game.truncate(n)?;
    resolver.resolve(&prefix).map_err(|error| Error::Resolution {
        ply: n,
        movetext: prefix.into_string(),
        error,
    })
}

/// Whether the piece placement after `n` half-moves equals that of `fen`.
/// Only the board field is compared.
///
/// # Errors
///
/// Same as [`board_state`].
pub fn has_board<R: Resolve + ?Sized>(
    game: &Game,
    fen: &Fen,
    n: usize,
    resolver: &R,
) -> Result<bool> {
    Ok(board_state(game, n, resolver)?.board == fen.board)
}

/// Whether the game ever reaches the piece placement of `fen`.
///
/// # Errors
///
/// [`Error::Resolution`] if the resolver fails before a match is found.
pub fn position_occurs<R: Resolve + ?Sized>(game: &Game, fen: &Fen, resolver: &R) -> Result<bool> {
    positions::occurs(game, &fen.board, resolver)
}

/// [`position_occurs`] with the arguments swapped.
pub fn board_in_game<R: Resolve + ?Sized>(fen: &Fen, game: &Game, resolver: &R) -> Result<bool> {
    position_occurs(game, fen, resolver)
}

/// Every position of the game as FEN text, in move order.
///
/// # Errors
///
/// [`Error::Resolution`] if the resolver fails.
pub fn all_positions<R: Resolve + ?Sized>(game: &Game, resolver: &R) -> Result<Vec<String>> {
    Positions::new(game, resolver)
        .map(|fen| fen.map(|fen| fen.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fen::STARTING_FEN, resolve::ShakmatyResolver};

    fn game(text: &str) -> Game {
        text.parse().expect("short game")
    }

    #[test]
    fn test_board_state() {
        let g = game("1. e4 e5 2. Nf3 Nc6 3. Bb5");
        assert_eq!(
            board_state(&g, 0, &ShakmatyResolver).unwrap().to_string(),
            STARTING_FEN
        );
        assert_eq!(
            board_state(&g, 4, &ShakmatyResolver).unwrap().to_string(),
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3"
        );
        assert!(board_state(&g, 6, &ShakmatyResolver)
            .unwrap_err()
            .is_not_enough_moves());
    }

    #[test]
    fn test_has_board_ignores_bookkeeping() {
        let g = game("1. e4 e5");
        let fen: Fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR b - - 40 90"
            .parse()
            .unwrap();
        assert!(has_board(&g, &fen, 2, &ShakmatyResolver).unwrap());
        assert!(!has_board(&g, &fen, 1, &ShakmatyResolver).unwrap());
        assert!(board_in_game(&fen, &g, &ShakmatyResolver).unwrap());
    }

    #[test]
    fn test_all_positions() {
        let positions = all_positions(&game("1. e4"), &ShakmatyResolver).unwrap();
        assert_eq!(
            positions,
            [
                STARTING_FEN,
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
            ]
        );
    }

    #[test]
    fn test_compact_move_numbers() {
        let g = game("1.e4 e5 2.Nf3 Nc6");
        assert_eq!(
            board_state(&g, 1, &ShakmatyResolver).unwrap().to_string(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
        assert_eq!(all_positions(&g, &ShakmatyResolver).unwrap().len(), 3);

        let positions = all_positions(&game("1. e4 1...e5 2. Nf3"), &ShakmatyResolver).unwrap();
        assert_eq!(
            positions.last().map(String::as_str),
            Some("rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2")
        );
    }

    #[test]
    fn test_soundness() {
        let g = game("1. d4 Nf6 2. c4 e6 3. Nc3 Bb4 4. e3 O-O");
        for (k, fen) in Positions::new(&g, &ShakmatyResolver).enumerate() {
            let fen = fen.unwrap();
            assert!(has_board(&g, &fen, k, &ShakmatyResolver).unwrap());
            assert!(position_occurs(&g, &fen, &ShakmatyResolver).unwrap());
        }
    }
}
