use itertools::Itertools;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace, warn};

use crate::{Cell, Config, KnowledgeError, Result, Sentence};

/// A move suggested by the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// The cell is proven safe.
    Safe(Cell),
    /// Nothing is proven safe; the cell was picked at random among the cells
    /// not known to be mines.
    Guess(Cell),
}

impl Move {
    pub fn cell(self) -> Cell {
        match self {
            Move::Safe(cell) | Move::Guess(cell) => cell,
        }
    }
}

/// Everything the player has learned about one game.
///
/// `moves_made`, `safe` and `mines` only ever grow, and `safe` and `mines`
/// never share a cell. Between calls every live sentence is non-empty,
/// consistent, unique, and mentions only unresolved cells.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    config: Config,
    moves_made: BTreeSet<Cell>,
    safe: BTreeSet<Cell>,
    mines: BTreeSet<Cell>,
    sentences: Vec<Sentence>,
}

// --- Construction and accessors ---

impl KnowledgeBase {
    pub fn new(height: usize, width: usize) -> Self {
        Self::with_config(Config::new(height, width))
    }

    pub fn with_config(config: Config) -> Self {
        KnowledgeBase {
            config,
            moves_made: BTreeSet::new(),
            safe: BTreeSet::new(),
            mines: BTreeSet::new(),
            sentences: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    /// Cells that have been revealed.
    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    /// Cells proven not to be mines, revealed or not.
    pub fn safe(&self) -> &BTreeSet<Cell> {
        &self.safe
    }

    /// Cells proven to be mines.
    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    fn check_bounds(&self, cell: Cell) -> Result<()> {
        if cell.in_bounds(self.height(), self.width()) {
            Ok(())
        } else {
            Err(KnowledgeError::OutOfBounds {
                cell,
                height: self.height(),
                width: self.width(),
            })
        }
    }
}

// --- Recording facts ---

impl KnowledgeBase {
    /// Marks `cell` as safe everywhere. Idempotent.
    ///
    /// Does not propagate; call [`propagate`](Self::propagate) after a batch
    /// of marks.
    pub fn mark_safe_global(&mut self, cell: Cell) -> Result<()> {
        self.check_bounds(cell)?;
        if self.mines.contains(&cell) {
            warn!(%cell, "safe cell is already a known mine");
            return Err(KnowledgeError::Contradiction { cell });
        }

        if self.safe.insert(cell) {
            debug!(%cell, "marked safe");
        }
        for sentence in &mut self.sentences {
            sentence.mark_safe(cell);
        }
        Ok(())
    }

    /// Marks `cell` as a mine everywhere. Idempotent.
    ///
    /// Does not propagate; call [`propagate`](Self::propagate) after a batch
    /// of marks.
    pub fn mark_mine_global(&mut self, cell: Cell) -> Result<()> {
        self.check_bounds(cell)?;
        if self.safe.contains(&cell) {
            warn!(%cell, "mine is already a known safe cell");
            return Err(KnowledgeError::Contradiction { cell });
        }
        // A failed mark must leave every sentence untouched.
        if let Some(sentence) = self
            .sentences
            .iter()
            .find(|s| s.count() == 0 && s.cells().contains(&cell))
        {
            warn!(%cell, %sentence, "mine inside a sentence with no mines left");
            return Err(KnowledgeError::NegativeCount {
                sentence: sentence.clone(),
                removed: 1,
            });
        }

        if self.mines.insert(cell) {
            debug!(%cell, "marked mine");
        }
        for sentence in &mut self.sentences {
            sentence.mark_mine(cell)?;
        }
        Ok(())
    }

    /// Called once per revealed cell with the number of mines among its
    /// neighbors, as reported by the board.
    ///
    /// Builds a sentence over the neighbors that are still unresolved, with
    /// already known mines subtracted from `count`, then propagates to a
    /// fixed point. Re-revealing a cell is a no-op.
    pub fn record_observation(&mut self, cell: Cell, count: usize) -> Result<()> {
        self.check_bounds(cell)?;
        if self.moves_made.contains(&cell) {
            debug!(%cell, "cell already observed");
            return Ok(());
        }

        let mut known_mines = 0;
        let mut unresolved = BTreeSet::new();
        for neighbor in cell.neighbors(self.height(), self.width()) {
            if self.mines.contains(&neighbor) {
                known_mines += 1;
            } else if !self.safe.contains(&neighbor) {
                unresolved.insert(neighbor);
            }
        }

        // Validate before mutating so a bad count leaves the state intact.
        let adjusted = count
            .checked_sub(known_mines)
            .filter(|&adjusted| adjusted <= unresolved.len())
            .ok_or_else(|| {
                warn!(%cell, count, "observation conflicts with the knowledge base");
                KnowledgeError::InconsistentObservation {
                    cell,
                    count,
                    known_mines,
                    unresolved: unresolved.len(),
                }
            })?;

        self.mark_safe_global(cell)?;
        self.moves_made.insert(cell);
        debug!(%cell, count, "recorded observation");

        if !unresolved.is_empty() {
            self.insert_sentence(Sentence::new(unresolved, adjusted));
        }

        self.propagate()?;
        Ok(())
    }

    /// Adds an externally known constraint, then propagates.
    ///
    /// Cells already resolved are removed from the sentence first, so the
    /// stored sentence only mentions unresolved cells.
    pub fn add_sentence(&mut self, mut sentence: Sentence) -> Result<()> {
        for &cell in sentence.cells() {
            self.check_bounds(cell)?;
        }
        if !sentence.is_consistent() {
            return Err(KnowledgeError::Overdetermined { sentence });
        }

        for cell in self.safe.iter() {
            sentence.mark_safe(*cell);
        }
        for cell in self.mines.iter() {
            sentence.mark_mine(*cell)?;
        }
        if !sentence.is_consistent() {
            return Err(KnowledgeError::Overdetermined { sentence });
        }

        self.insert_sentence(sentence);
        self.propagate()?;
        Ok(())
    }

    /// Inserts a non-empty sentence unless an equal one is already live.
    fn insert_sentence(&mut self, sentence: Sentence) -> bool {
        if sentence.is_empty() || self.sentences.contains(&sentence) {
            return false;
        }
        trace!(%sentence, "new sentence");
        self.sentences.push(sentence);
        true
    }
}

// --- Propagation ---

impl KnowledgeBase {
    /// Runs inference passes until one of them learns nothing new.
    ///
    /// Returns the number of passes that made progress, so `Ok(0)` means the
    /// knowledge base was already at its fixed point.
    pub fn propagate(&mut self) -> Result<usize> {
        let limit = self.config.passes_for(self.sentences.len());
        let mut productive = 0;

        while self.propagation_pass()? {
            productive += 1;
            if productive >= limit {
                warn!(limit, "propagation did not settle");
                return Err(KnowledgeError::PassLimitExceeded { limit });
            }
        }

        trace!(passes = productive, sentences = self.sentences.len(), "propagation settled");
        Ok(productive)
    }

    /// One inference pass. Returns whether a cell was resolved or a new
    /// sentence was derived.
    fn propagation_pass(&mut self) -> Result<bool> {
        let resolved_before = self.safe.len() + self.mines.len();

        // 1. Sentences that pin down all of their cells.
        let mut new_safe = BTreeSet::new();
        let mut new_mines = BTreeSet::new();
        for sentence in &self.sentences {
            if let Some(cells) = sentence.known_safe() {
                new_safe.extend(cells.difference(&self.safe).copied());
            }
            if let Some(cells) = sentence.known_mines() {
                new_mines.extend(cells.difference(&self.mines).copied());
            }
        }
        for cell in new_safe {
            self.mark_safe_global(cell)?;
        }
        for cell in new_mines {
            self.mark_mine_global(cell)?;
        }

        if let Some(sentence) = self.sentences.iter().find(|s| !s.is_consistent()) {
            warn!(%sentence, "sentence has more mines than cells");
            return Err(KnowledgeError::Overdetermined {
                sentence: sentence.clone(),
            });
        }

        // 2. Drop resolved sentences and sentences that became duplicates.
        let mut seen = HashSet::new();
        self.sentences
            .retain(|sentence| !sentence.is_empty() && seen.insert(sentence.clone()));

        // 3. Subset elimination over every ordered pair.
        let derived = self.subset_eliminations()?;
        let mut added = 0;
        for sentence in derived {
            if self.insert_sentence(sentence) {
                added += 1;
            }
        }

        let resolved_after = self.safe.len() + self.mines.len();
        Ok(resolved_after > resolved_before || added > 0)
    }

    /// For every pair with `a.cells ⊆ b.cells`, the cells in `b` but not in
    /// `a` hold `b.count - a.count` mines.
    fn subset_eliminations(&self) -> Result<Vec<Sentence>> {
        let n = self.sentences.len();
        let mut derived = Vec::new();

        for (i, j) in (0..n).cartesian_product(0..n) {
            if i == j {
                continue;
            }
            let (subset, superset) = (&self.sentences[i], &self.sentences[j]);
            if subset.is_empty() || !subset.is_subset_of(superset) {
                continue;
            }

            let sentence = superset.difference(subset).inspect_err(|_| {
                warn!(%subset, %superset, "subset holds more mines than its superset");
            })?;
            if !sentence.is_consistent() {
                warn!(%subset, %superset, "subset elimination overfills the remainder");
                return Err(KnowledgeError::Overdetermined { sentence });
            }
            if !sentence.is_empty() {
                trace!(%subset, %superset, derived = %sentence, "subset elimination");
                derived.push(sentence);
            }
        }

        Ok(derived)
    }

    /// Validates every structural invariant of a settled knowledge base.
    pub fn check_invariants(&self) -> Result<()> {
        for &cell in self.moves_made.iter().chain(&self.safe).chain(&self.mines) {
            self.check_bounds(cell)?;
        }
        if let Some(&cell) = self
            .safe
            .intersection(&self.mines)
            .chain(self.moves_made.intersection(&self.mines))
            .next()
        {
            return Err(KnowledgeError::Contradiction { cell });
        }
        if let Some(&cell) = self.moves_made.difference(&self.safe).next() {
            return Err(KnowledgeError::RevealedNotSafe { cell });
        }

        let mut seen = HashSet::new();
        for sentence in &self.sentences {
            if sentence.is_empty() {
                return Err(KnowledgeError::EmptySentence {
                    sentence: sentence.clone(),
                });
            }
            if !seen.insert(sentence) {
                return Err(KnowledgeError::DuplicateSentence {
                    sentence: sentence.clone(),
                });
            }
            for &cell in sentence.cells() {
                self.check_bounds(cell)?;
                if self.safe.contains(&cell) || self.mines.contains(&cell) {
                    return Err(KnowledgeError::Unsettled {
                        sentence: sentence.clone(),
                        cell,
                    });
                }
            }
            if !sentence.is_consistent() {
                return Err(KnowledgeError::Overdetermined {
                    sentence: sentence.clone(),
                });
            }
        }
        Ok(())
    }
}

// --- Move selection ---

impl KnowledgeBase {
    /// The smallest (row, col) cell that is proven safe but not yet revealed.
    pub fn safe_move(&self) -> Option<Cell> {
        self.safe.difference(&self.moves_made).next().copied()
    }

    /// Cells that have not been revealed and are not known mines, in
    /// row-major order.
    pub fn available_cells(&self) -> Vec<Cell> {
        Cell::all(self.height(), self.width())
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect()
    }

    /// A uniformly random cell among [`available_cells`](Self::available_cells).
    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        self.available_cells().choose(rng).copied()
    }

    /// Safe moves first, random guesses otherwise. `None` once every
    /// remaining cell is a known mine.
    pub fn next_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        self.safe_move()
            .map(Move::Safe)
            .or_else(|| self.random_move(rng).map(Move::Guess))
    }
}

// --- Serialization ---

impl KnowledgeBase {
    /// Serializes the knowledge base to BCS bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Deserializes a knowledge base and checks its invariants.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let knowledge: KnowledgeBase = bcs::from_bytes(bytes)?;
        knowledge.check_invariants()?;
        Ok(knowledge)
    }
}
