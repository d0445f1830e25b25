//! Turning a stream of moves into the position it reaches.
//!
//! The rules of chess live behind the [`Resolve`] trait. [`ShakmatyResolver`]
//! implements it with the `shakmaty` move generator, and [`Supervised`]
//! runs any resolver on a dedicated worker thread with a timeout.
//!
//! # Examples
//!
//! ```
//! use chessdb::{Game, resolve::{Resolve, ShakmatyResolver}};
//!
//! let game: Game = "1. e4 e5 2. Nf3".parse()?;
//! let fen = ShakmatyResolver.resolve(&game)?;
//! assert_eq!(fen.to_string(), "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use std::{fmt, sync::Arc, thread};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use shakmaty::{
    san::{SanError, SanPlus},
    Chess, EnPassantMode, Position,
};
use tracing::{debug, warn};

use crate::{config::Config, errors::ResolveError, fen::Fen, game::Game};

/// Applies the rules of chess to the half-moves of a game.
///
/// Implementations must return the standard starting position for a game
/// without half-moves.
pub trait Resolve {
    /// Plays the half-moves of `movetext` from the starting position and
    /// returns the final position.
    ///
    /// # Errors
    ///
    /// Fails if a half-move can not be parsed, is illegal or is ambiguous
    /// in its position, or if the resolver itself fails.
    fn resolve(&self, movetext: &Game) -> Result<Fen, ResolveError>;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, movetext: &Game) -> Result<Fen, ResolveError> {
        (**self).resolve(movetext)
    }
}

impl<R: Resolve + ?Sized> Resolve for Box<R> {
    fn resolve(&self, movetext: &Game) -> Result<Fen, ResolveError> {
        (**self).resolve(movetext)
    }
}

impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, movetext: &Game) -> Result<Fen, ResolveError> {
        (**self).resolve(movetext)
    }
}

/// Resolves games with the `shakmaty` rules implementation.
///
/// Standalone annotation glyphs, move numbers, comments and variations are
/// ignored. A move written against its number (`1.e4`, `1...e5`) is played,
/// and glyphs attached to a move (`e4!?`) are stripped.
#[derive(Debug, Default, Copy, Clone)]
pub struct ShakmatyResolver;

impl Resolve for ShakmatyResolver {
    fn resolve(&self, movetext: &Game) -> Result<Fen, ResolveError> {
        let mut pos = Chess::default();
        let mut plies = 0;

        for (ply, text) in movetext.tokens().filter_map(|token| token.san()).enumerate() {
            let san = text.trim_end_matches(['!', '?']);
            let san_plus =
                SanPlus::from_ascii(san.as_bytes()).map_err(|_| ResolveError::InvalidSan {
                    ply,
                    san: text.to_owned(),
                })?;
            let m = san_plus.san.to_move(&pos).map_err(|err| match err {
                SanError::AmbiguousSan => ResolveError::AmbiguousSan {
                    ply,
                    san: text.to_owned(),
                },
                _ => ResolveError::IllegalSan {
                    ply,
                    san: text.to_owned(),
                },
            })?;
            pos.play_unchecked(&m);
            plies = ply + 1;
        }

        let fen =
            shakmaty::fen::Fen::from_setup(pos.into_setup(EnPassantMode::Legal)).to_string();
        debug!(plies, %fen, "resolved position");
        fen.parse().map_err(|_| ResolveError::Unrepresentable { fen })
    }
}

struct Job {
    movetext: Game,
    reply: Sender<Result<Fen, ResolveError>>,
}

/// Runs resolutions on a long-lived worker thread.
///
/// The resolver is built by `factory` on the worker thread, so it does not
/// need to be `Send` or `Sync`. Calls from all callers are queued and
/// handled one at a time. A call that is not answered within
/// [`Config::timeout`] fails with [`ResolveError::Timeout`], and the worker
/// is abandoned and replaced on the next call.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use chessdb::{
///     Game,
///     config::Config,
///     resolve::{Resolve, ShakmatyResolver, Supervised},
/// };
///
/// let resolver = Supervised::with_config(
///     || ShakmatyResolver,
///     Config::default().with_timeout(Some(Duration::from_secs(5))),
/// );
/// let fen = resolver.resolve(&Game::empty())?;
/// assert_eq!(fen.to_string(), chessdb::fen::STARTING_FEN);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub struct Supervised<F> {
    factory: Arc<F>,
    config: Config,
    worker: Mutex<Option<Sender<Job>>>,
}

impl<F> fmt::Debug for Supervised<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervised")
            .field("config", &self.config)
            .field("running", &self.worker.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl<F, R> Supervised<F>
where
    F: Fn() -> R + Send + Sync + 'static,
    R: Resolve,
{
    pub fn new(factory: F) -> Supervised<F> {
        Supervised::with_config(factory, Config::default())
    }

    pub fn with_config(factory: F, config: Config) -> Supervised<F> {
        Supervised {
            factory: Arc::new(factory),
            config,
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn spawn(&self) -> Result<Sender<Job>, ResolveError> {
        let (send, recv) = crossbeam_channel::unbounded::<Job>();
        let factory = Arc::clone(&self.factory);

        thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                let resolver = factory();
                for job in recv {
                    // The caller may have timed out already.
                    let _ = job.reply.send(resolver.resolve(&job.movetext));
                }
            })
            .map_err(|err| ResolveError::Spawn {
                reason: err.to_string(),
            })?;

        debug!(thread = %self.config.thread_name, "spawned resolver worker");
        Ok(send)
    }

    /// Sends a job to the current worker, starting one if needed.
    fn submit(&self, job: Job) -> Result<Sender<Job>, ResolveError> {
        let mut worker = self.worker.lock();
        let sender = match (*worker).clone() {
            Some(sender) => sender,
            None => {
                let sender = self.spawn()?;
                *worker = Some(sender.clone());
                sender
            }
        };

        if sender.send(job).is_err() {
            warn!("resolver worker disconnected");
            *worker = None;
            return Err(ResolveError::Disconnected);
        }

        Ok(sender)
    }

    /// Drops the worker behind `sender` unless it was already replaced.
    fn abandon(&self, sender: &Sender<Job>) {
        let mut worker = self.worker.lock();
        if worker
            .as_ref()
            .is_some_and(|current| current.same_channel(sender))
        {
            *worker = None;
        }
    }

    fn wait(
        &self,
        sender: &Sender<Job>,
        answer: Receiver<Result<Fen, ResolveError>>,
    ) -> Result<Fen, ResolveError> {
        let received = match self.config.timeout {
            Some(timeout) => answer.recv_timeout(timeout).map_err(|err| match err {
                RecvTimeoutError::Timeout => ResolveError::Timeout { after: timeout },
                RecvTimeoutError::Disconnected => ResolveError::Disconnected,
            }),
            None => answer.recv().map_err(|_| ResolveError::Disconnected),
        };

        match received {
            Ok(result) => result,
            Err(err) => {
                warn!(%err, "abandoning resolver worker");
                self.abandon(sender);
                Err(err)
            }
        }
    }
}

impl<F, R> Resolve for Supervised<F>
where
    F: Fn() -> R + Send + Sync + 'static,
    R: Resolve,
{
    fn resolve(&self, movetext: &Game) -> Result<Fen, ResolveError> {
        let (reply, answer) = crossbeam_channel::bounded(1);
        let sender = self.submit(Job {
            movetext: movetext.clone(),
            reply,
        })?;
        self.wait(&sender, answer)
    }
}
