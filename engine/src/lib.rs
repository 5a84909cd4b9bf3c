//! A knowledge-based Minesweeper player.
//!
//! Every revealed cell becomes a [`Sentence`] ("exactly `count` of these
//! cells are mines"). The [`KnowledgeBase`] folds sentences together until
//! nothing more can be concluded, which yields cells that are certainly safe
//! or certainly mines. Moves are chosen safe-first with a random fallback.

pub mod autoplay;
mod board;
mod cell;
mod config;
mod error;
mod knowledge;
#[cfg(test)]
mod oracle;
mod sentence;

pub use board::Board;
pub use cell::Cell;
pub use config::Config;
pub use error::{KnowledgeError, Result};
pub use knowledge::{KnowledgeBase, Move};
pub use sentence::Sentence;
