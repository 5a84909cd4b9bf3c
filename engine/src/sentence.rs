use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

use crate::{Cell, KnowledgeError, Result};

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// A revealed '1' with three hidden neighbors becomes the sentence
/// `{a, b, c} = 1`. Sentences shrink as cells get resolved elsewhere and are
/// discarded by the knowledge base once `cells` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        Sentence {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A sentence without cells carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `0 <= count <= |cells|`; the lower bound is enforced by the type.
    pub fn is_consistent(&self) -> bool {
        self.count <= self.cells.len()
    }

    pub fn is_subset_of(&self, other: &Sentence) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Every remaining cell must be a mine.
    pub fn known_mines(&self) -> Option<&BTreeSet<Cell>> {
        (self.count == self.cells.len()).then_some(&self.cells)
    }

    /// No remaining cell can be a mine.
    pub fn known_safe(&self) -> Option<&BTreeSet<Cell>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// Removes a cell that turned out to be a mine, taking its mine with it.
    ///
    /// Returns whether the cell was part of the sentence. A sentence that has
    /// no mines left cannot contain one, so that case is an error and leaves
    /// the sentence untouched.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(KnowledgeError::NegativeCount {
                sentence: self.clone(),
                removed: 1,
            });
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Removes a cell that turned out to be safe. The count is unchanged.
    pub fn mark_safe(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// Subset elimination: if `subset.cells ⊆ self.cells` then the cells only
    /// `self` mentions hold `self.count - subset.count` mines.
    ///
    /// The caller is responsible for the subset check.
    pub fn difference(&self, subset: &Sentence) -> Result<Sentence> {
        let count = self
            .count
            .checked_sub(subset.count)
            .ok_or_else(|| KnowledgeError::NegativeCount {
                sentence: self.clone(),
                removed: subset.count,
            })?;
        Ok(Sentence {
            cells: self.cells.difference(&subset.cells).copied().collect(),
            count,
        })
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
