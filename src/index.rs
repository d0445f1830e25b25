//! Key model of an inverted index over the positions of games.
//!
//! A stored game is indexed under the piece placement ([`Board`]) of every
//! position it passes through. Side to move, castling rights, en passant
//! square and clocks are not part of the key, so a search finds a position
//! regardless of move order or bookkeeping. A probe is the piece placement of
//! a single FEN.
//!
//! The functions here are what an inverted index access method calls back
//! into. [`PositionIndex`] is a complete in-memory index built on them.
//!
//! # Examples
//!
//! ```
//! use chessdb::{Fen, Game, index::PositionIndex, resolve::ShakmatyResolver};
//!
//! let mut index = PositionIndex::new();
//! index.insert(1, "1. e4 e5 2. Nf3 Nc6".parse()?, &ShakmatyResolver)?;
//! index.insert(2, "1. Nf3 Nc6 2. e4 e5".parse()?, &ShakmatyResolver)?;
//! index.insert(3, "1. d4 d5".parse()?, &ShakmatyResolver)?;
//!
//! let probe: Fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3".parse()?;
//! assert_eq!(index.search(&probe, &ShakmatyResolver)?, [1, 2]);
//! # Ok::<_, chessdb::Error>(())
//! ```

use std::{cmp::Ordering, collections::BTreeSet, hash::Hash};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::{
    errors::Result,
    fen::{Board, Fen},
    game::Game,
    positions::{self, Positions},
    resolve::Resolve,
};

/// The distinct piece placements of a game, in the order they first occur.
///
/// # Errors
///
/// [`Error::Resolution`](crate::Error::Resolution) if the resolver fails.
pub fn extract_value<R: Resolve + ?Sized>(game: &Game, resolver: &R) -> Result<Vec<Board>> {
    let mut seen = FxHashSet::default();
    let mut keys = Vec::new();
    for fen in Positions::new(game, resolver) {
        let board = fen?.board;
        if seen.insert(board.clone()) {
            keys.push(board);
        }
    }
    Ok(keys)
}

/// How the index should treat a query.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SearchMode {
    /// Only items containing at least one query key are candidates.
    #[default]
    Default,
}

/// Keys to probe for.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Query {
    pub keys: Vec<Board>,
    pub mode: SearchMode,
}

/// A query for games passing through the piece placement of `probe`.
pub fn extract_query(probe: &Fen) -> Query {
    Query {
        keys: vec![probe.board.clone()],
        mode: SearchMode::Default,
    }
}

/// Total order on keys, comparing bytes.
pub fn compare(a: &Board, b: &Board) -> Ordering {
    a.as_str().as_bytes().cmp(b.as_str().as_bytes())
}

/// Outcome of [`consistent`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Consistency {
    pub matches: bool,
    /// Whether the item must be confirmed with [`recheck`].
    pub recheck: bool,
}

/// Boolean consistency check. `check[i]` tells whether the item contains
/// `query_keys[i]`.
pub fn consistent(check: &[bool], query_keys: &[Board], probe: &Board) -> Consistency {
    let exact = check
        .iter()
        .zip(query_keys)
        .any(|(&present, key)| present && key == probe);

    Consistency {
        matches: exact,
        recheck: !exact,
    }
}

/// A three-valued truth value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Ternary {
    False,
    True,
    Maybe,
}

impl From<bool> for Ternary {
    fn from(b: bool) -> Ternary {
        if b {
            Ternary::True
        } else {
            Ternary::False
        }
    }
}

/// Three-valued consistency check.
///
/// Returns [`Ternary::False`] as soon as a query key is reported absent,
/// [`Ternary::True`] if a present key equals the probe, and
/// [`Ternary::Maybe`] otherwise.
pub fn tri_consistent(check: &[Ternary], query_keys: &[Board], probe: &Board) -> Ternary {
    let mut result = Ternary::Maybe;
    for (&state, key) in check.iter().zip(query_keys) {
        match state {
            Ternary::False => return Ternary::False,
            Ternary::True if key == probe => result = Ternary::True,
            _ => {}
        }
    }
    result
}

/// Confirms a candidate by replaying the whole game.
///
/// # Errors
///
/// [`Error::Resolution`](crate::Error::Resolution) if the resolver fails.
pub fn recheck<R: Resolve + ?Sized>(game: &Game, probe: &Board, resolver: &R) -> Result<bool> {
    positions::occurs(game, probe, resolver)
}

#[derive(Debug, Clone)]
struct Entry {
    game: Game,
    keys: Vec<Board>,
}

/// An in-memory inverted index from piece placements to game ids.
#[derive(Debug, Clone)]
pub struct PositionIndex<K> {
    entries: FxHashMap<K, Entry>,
    postings: FxHashMap<Board, BTreeSet<K>>,
}

impl<K> Default for PositionIndex<K> {
    fn default() -> Self {
        PositionIndex {
            entries: FxHashMap::default(),
            postings: FxHashMap::default(),
        }
    }
}

impl<K: Clone + Ord + Hash> PositionIndex<K> {
    pub fn new() -> PositionIndex<K> {
        PositionIndex::default()
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys over all games.
    pub fn num_keys(&self) -> usize {
        self.postings.len()
    }

    pub fn get(&self, id: &K) -> Option<&Game> {
        self.entries.get(id).map(|entry| &entry.game)
    }

    /// Indexes a game, replacing any game stored under the same id.
    /// Returns the number of keys extracted.
    ///
    /// # Errors
    ///
    /// [`Error::Resolution`](crate::Error::Resolution) if the game can not
    /// be replayed. The index is left unchanged.
    pub fn insert<R: Resolve + ?Sized>(&mut self, id: K, game: Game, resolver: &R) -> Result<usize> {
        let keys = extract_value(&game, resolver)?;
        self.remove(&id);

        for key in &keys {
            self.postings
                .entry(key.clone())
                .or_default()
                .insert(id.clone());
        }

        let num_keys = keys.len();
        debug!(num_keys, game = %game, "indexed game");
        self.entries.insert(id, Entry { game, keys });
        Ok(num_keys)
    }

    /// Removes a game and its postings.
    pub fn remove(&mut self, id: &K) -> Option<Game> {
        let entry = self.entries.remove(id)?;
        for key in &entry.keys {
            if let Some(ids) = self.postings.get_mut(key) {
                ids.remove(id);
                if ids.is_empty() {
                    self.postings.remove(key);
                }
            }
        }
        Some(entry.game)
    }

    fn contains_key(&self, id: &K, key: &Board) -> bool {
        self.postings.get(key).is_some_and(|ids| ids.contains(id))
    }

    /// Ids of games containing at least one query key.
    pub fn candidates(&self, query: &Query) -> BTreeSet<K> {
        query
            .keys
            .iter()
            .filter_map(|key| self.postings.get(key))
            .flatten()
            .cloned()
            .collect()
    }

    /// Ids of all games passing through the piece placement of `probe`, in
    /// ascending order.
    ///
    /// # Errors
    ///
    /// [`Error::Resolution`](crate::Error::Resolution) if a candidate needs
    /// to be rechecked and can not be replayed.
    pub fn search<R: Resolve + ?Sized>(&self, probe: &Fen, resolver: &R) -> Result<Vec<K>> {
        let query = extract_query(probe);
        let candidates = self.candidates(&query);
        debug!(probe = %probe.board, candidates = candidates.len(), "probing index");

        let mut found = Vec::new();
        for id in candidates {
            let check: Vec<Ternary> = query
                .keys
                .iter()
                .map(|key| Ternary::from(self.contains_key(&id, key)))
                .collect();

            let confirmed = match tri_consistent(&check, &query.keys, &probe.board) {
                Ternary::True => true,
                Ternary::False => false,
                Ternary::Maybe => match self.entries.get(&id) {
                    Some(entry) => recheck(&entry.game, &probe.board, resolver)?,
                    None => false,
                },
            };
            if confirmed {
                found.push(id);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ShakmatyResolver;

    fn board(s: &str) -> Board {
        s.parse().expect("valid board")
    }

    #[test]
    fn test_extract_value_dedups() {
        // Knights out and back repeats the starting placement.
        let game: Game = "1. Nf3 Nf6 2. Ng1 Ng8 3. e4".parse().unwrap();
        let keys = extract_value(&game, &ShakmatyResolver).unwrap();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], Board::starting());
        assert_eq!(
            keys[4],
            board("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR")
        );
    }

    #[test]
    fn test_extract_query() {
        let query = extract_query(&Fen::starting());
        assert_eq!(query.keys, [Board::starting()]);
        assert_eq!(query.mode, SearchMode::Default);
    }

    #[test]
    fn test_compare() {
        let a = board("8/8/8/8/8/8/8/K6k");
        let b = board("8/8/8/8/8/8/8/k6K");
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&b, &a), Ordering::Greater);
        assert_eq!(compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_consistent() {
        let probe = Board::starting();
        let other = board("8/8/8/8/8/8/8/k6K");

        assert_eq!(
            consistent(&[true], &[probe.clone()], &probe),
            Consistency {
                matches: true,
                recheck: false
            }
        );
        assert_eq!(
            consistent(&[false], &[probe.clone()], &probe),
            Consistency {
                matches: false,
                recheck: true
            }
        );
        assert!(!consistent(&[true], &[other], &probe).matches);
    }

    #[test]
    fn test_tri_consistent() {
        let probe = Board::starting();
        let other = board("8/8/8/8/8/8/8/k6K");
        let keys = [other.clone(), probe.clone()];

        assert_eq!(
            tri_consistent(&[Ternary::True, Ternary::True], &keys, &probe),
            Ternary::True
        );
        assert_eq!(
            tri_consistent(&[Ternary::True, Ternary::False], &keys, &probe),
            Ternary::False
        );
        assert_eq!(
            tri_consistent(&[Ternary::Maybe, Ternary::True], &keys, &probe),
            Ternary::True
        );
        assert_eq!(
            tri_consistent(&[Ternary::True, Ternary::Maybe], &keys, &probe),
            Ternary::Maybe
        );
        assert_eq!(tri_consistent(&[], &[], &probe), Ternary::Maybe);
    }

    #[test]
    fn test_recheck() {
        let game: Game = "1. e4 e5".parse().unwrap();
        assert!(recheck(&game, &Board::starting(), &ShakmatyResolver).unwrap());
        assert!(!recheck(&game, &board("8/8/8/8/8/8/8/k6K"), &ShakmatyResolver).unwrap());
    }

    #[test]
    fn test_index_remove() {
        let mut index = PositionIndex::new();
        index.insert("a", "1. e4".parse().unwrap(), &ShakmatyResolver).unwrap();
        index.insert("b", "1. d4".parse().unwrap(), &ShakmatyResolver).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.num_keys(), 3);

        let start = Fen::starting();
        assert_eq!(index.search(&start, &ShakmatyResolver).unwrap(), ["a", "b"]);

        assert!(index.remove(&"a").is_some());
        assert_eq!(index.num_keys(), 2);
        assert_eq!(index.search(&start, &ShakmatyResolver).unwrap(), ["b"]);
        assert!(index.get(&"a").is_none());
    }

    #[test]
    fn test_index_replace() {
        let mut index = PositionIndex::new();
        index.insert(7, "1. e4".parse().unwrap(), &ShakmatyResolver).unwrap();
        index.insert(7, "1. d4".parse().unwrap(), &ShakmatyResolver).unwrap();
        assert_eq!(index.len(), 1);

        let after_e4: Fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
            .parse()
            .unwrap();
        assert!(index.search(&after_e4, &ShakmatyResolver).unwrap().is_empty());
    }

    #[test]
    fn test_index_insert_failure_leaves_index_unchanged() {
        let mut index = PositionIndex::new();
        index.insert(1, "1. e4".parse().unwrap(), &ShakmatyResolver).unwrap();
        assert!(index
            .insert(1, "1. e5".parse().unwrap(), &ShakmatyResolver)
            .is_err());
        assert_eq!(index.get(&1).map(Game::as_str), Some("1. e4"));
    }
}
