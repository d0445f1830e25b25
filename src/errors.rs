use std::{error, fmt, time::Duration};

/// A specialized [`Result`](std::result::Result) for fallible
/// operations on games and positions.
pub type Result<T> = std::result::Result<T, Error>;

/// A field of a FEN record, used to report where validation failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FenField {
    /// The record does not consist of exactly six fields.
    FieldCount,
    Board,
    Turn,
    Castling,
    EnPassant,
    HalfmoveClock,
    Fullmoves,
}

impl FenField {
    fn name(self) -> &'static str {
        match self {
            FenField::FieldCount => "field count",
            FenField::Board => "board",
            FenField::Turn => "side to move",
            FenField::Castling => "castling rights",
            FenField::EnPassant => "en passant square",
            FenField::HalfmoveClock => "halfmove clock",
            FenField::Fullmoves => "fullmove number",
        }
    }
}

impl fmt::Display for FenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error when a [`Resolve`](crate::resolve::Resolve) implementation could
/// not turn a move stream into a position.
#[derive(Debug)]
pub enum ResolveError {
    /// A half-move is not syntactically valid SAN.
    InvalidSan {
        /// Zero-based index of the half-move in the stream.
        ply: usize,
        san: String,
    },
    /// A half-move does not match any legal move in its position.
    IllegalSan { ply: usize, san: String },
    /// A half-move matches more than one legal move.
    AmbiguousSan { ply: usize, san: String },
    /// The rules engine produced text that is not a valid FEN.
    Unrepresentable { fen: String },
    /// The resolver did not answer in time.
    Timeout { after: Duration },
    /// The resolver worker went away before answering.
    Disconnected,
    /// The resolver worker could not be started.
    Spawn { reason: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::InvalidSan { ply, san } => {
                write!(f, "invalid san at ply {ply}: {san:?}")
            }
            ResolveError::IllegalSan { ply, san } => {
                write!(f, "illegal san at ply {ply}: {san:?}")
            }
            ResolveError::AmbiguousSan { ply, san } => {
                write!(f, "ambiguous san at ply {ply}: {san:?}")
            }
            ResolveError::Unrepresentable { fen } => {
                write!(f, "rules engine returned an unusable fen: {fen:?}")
            }
            ResolveError::Timeout { after } => {
                write!(f, "resolver did not answer within {after:?}")
            }
            ResolveError::Disconnected => f.write_str("resolver worker disconnected"),
            ResolveError::Spawn { reason } => {
                write!(f, "could not start resolver worker: {reason}")
            }
        }
    }
}

impl error::Error for ResolveError {}

/// Error when constructing or querying games and positions.
///
/// Every variant carries the raw input it was raised for.
#[derive(Debug)]
pub enum Error {
    /// FEN text could not be split into six fields with integer clocks.
    MalformedFen { input: String },
    /// FEN text failed structural validation.
    InvalidFen { field: FenField, input: String },
    /// Game text is longer than [`Game::MAX_LEN`](crate::Game::MAX_LEN).
    TooLong { len: usize, max: usize, input: String },
    /// The game has fewer half-moves than requested.
    NotEnoughMoves {
        requested: usize,
        available: usize,
        game: String,
    },
    /// The resolver failed on a prefix of the game.
    Resolution {
        /// Number of half-moves in the prefix.
        ply: usize,
        movetext: String,
        error: ResolveError,
    },
    /// A required argument was missing.
    NullArgument {
        function: &'static str,
        /// Zero-based argument position.
        position: usize,
    },
    /// A half-move count was negative.
    NegativeHalfMoves { function: &'static str, count: i32 },
    /// The opening is longer than the game it is matched against.
    OpeningTooLong { game: String, opening: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedFen { input } => write!(f, "malformed fen: {input:?}"),
            Error::InvalidFen { field, input } => {
                write!(f, "invalid fen ({field}): {input:?}")
            }
            Error::TooLong { len, max, input } => write!(
                f,
                "game text too long ({len} bytes, at most {max} allowed): {input:?}"
            ),
            Error::NotEnoughMoves {
                requested,
                available,
                game,
            } => write!(
                f,
                "not enough moves (requested {requested} half-moves, game has {available}): {game:?}"
            ),
            Error::Resolution {
                ply,
                movetext,
                error,
            } => write!(
                f,
                "could not resolve position after {ply} half-moves ({error}): {movetext:?}"
            ),
            Error::NullArgument { function, position } => {
                write!(f, "{function}: argument {position} is null")
            }
            Error::NegativeHalfMoves { function, count } => {
                write!(f, "{function}: negative number of half-moves: {count}")
            }
            Error::OpeningTooLong { game, opening } => write!(
                f,
                "game is shorter than opening moves: game {game:?}, opening {opening:?}"
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Resolution { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl Error {
    /// Whether this error means the game simply ended before the requested
    /// half-move, as opposed to a broken input or resolver.
    pub fn is_not_enough_moves(&self) -> bool {
        matches!(self, Error::NotEnoughMoves { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_input() {
        let err = Error::InvalidFen {
            field: FenField::Turn,
            input: "8/8/8/8/8/8/8/8 x - - 0 1".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid fen (side to move): \"8/8/8/8/8/8/8/8 x - - 0 1\""
        );
    }

    #[test]
    fn test_resolution_source() {
        let err = Error::Resolution {
            ply: 1,
            movetext: "1. e5".to_owned(),
            error: ResolveError::IllegalSan {
                ply: 0,
                san: "e5".to_owned(),
            },
        };
        assert!(error::Error::source(&err).is_some());
        assert!(!err.is_not_enough_moves());
    }
}
