use thiserror::Error;

use crate::{Cell, Sentence};

/// Everything that can go wrong while feeding observations to a
/// [`KnowledgeBase`](crate::KnowledgeBase).
///
/// Apart from `OutOfBounds`, which is a caller contract violation, every
/// variant means the observations contradict each other: either the board
/// reported a wrong count or the engine has a bug. In both cases the
/// knowledge base can no longer be trusted and the game should be abandoned.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error(
        "{count} mines reported around {cell}, but {known_mines} are already known and {unresolved} neighbors are unresolved"
    )]
    InconsistentObservation {
        cell: Cell,
        count: usize,
        known_mines: usize,
        unresolved: usize,
    },

    #[error("removing {removed} mine(s) from {sentence} leaves a negative count")]
    NegativeCount { sentence: Sentence, removed: usize },

    #[error("{sentence} claims more mines than it has cells")]
    Overdetermined { sentence: Sentence },

    #[error("cell {cell} is marked both safe and a mine")]
    Contradiction { cell: Cell },

    #[error("{sentence} still references resolved cell {cell}")]
    Unsettled { sentence: Sentence, cell: Cell },

    #[error("revealed cell {cell} is not marked safe")]
    RevealedNotSafe { cell: Cell },

    #[error("{sentence} has no cells left")]
    EmptySentence { sentence: Sentence },

    #[error("{sentence} is held more than once")]
    DuplicateSentence { sentence: Sentence },

    #[error("propagation did not settle within {limit} passes")]
    PassLimitExceeded { limit: usize },

    #[error("knowledge base encoding failed: {0}")]
    Codec(#[from] bcs::Error),
}

pub type Result<T, E = KnowledgeError> = std::result::Result<T, E>;
