use rand::Rng;
use tracing::{debug, info};

use crate::{Board, Cell, KnowledgeBase, Move, Result};

/// How a game driven by the knowledge base ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every mine was identified.
    Won,
    /// A guess landed on this mine.
    Lost(Cell),
    /// No move was left to make without winning.
    Stuck,
}

#[derive(Debug, Clone)]
pub struct GameReport {
    pub outcome: Outcome,
    /// Every move in play order, including the losing one.
    pub moves: Vec<Move>,
    pub knowledge: KnowledgeBase,
}

impl GameReport {
    /// How many moves were random guesses.
    pub fn guesses(&self) -> usize {
        self.moves
            .iter()
            .filter(|m| matches!(m, Move::Guess(_)))
            .count()
    }
}

/// Plays a full game on `board`: proven safe cells first, random guesses
/// otherwise, feeding every reveal back into a fresh knowledge base.
///
/// Errors only if the knowledge base detects an inconsistency.
pub fn play<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Result<GameReport> {
    play_observed(board, rng, |_, _| {})
}

/// Like [`play`], calling `observe` after every safe reveal has been folded
/// into the knowledge base. The losing reveal is only reported in the outcome.
pub fn play_observed<R, F>(board: &Board, rng: &mut R, mut observe: F) -> Result<GameReport>
where
    R: Rng + ?Sized,
    F: FnMut(Move, &KnowledgeBase),
{
    let mut knowledge = KnowledgeBase::new(board.height(), board.width());
    let mut moves = Vec::new();

    let outcome = loop {
        if board.won(knowledge.mines()) {
            break Outcome::Won;
        }

        let Some(next) = knowledge.next_move(rng) else {
            break Outcome::Stuck;
        };
        moves.push(next);

        let cell = next.cell();
        debug!(%cell, ?next, "revealing");
        if board.is_mine(cell) {
            break Outcome::Lost(cell);
        }
        knowledge.record_observation(cell, board.nearby_mines(cell) as usize)?;
        observe(next, &knowledge);
    };

    let report = GameReport {
        outcome,
        moves,
        knowledge,
    };
    info!(?outcome, moves = report.moves.len(), guesses = report.guesses(), "game over");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_outcome_matches_board() {
        // Whatever the guesses, a loss is always on the mine and a win finds it
        let board = Board::from_layout(
            "
            .....
            .....
            .....
            ....*
            ",
        )
        .unwrap();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = play(&board, &mut rng).unwrap();
            match report.outcome {
                Outcome::Won => {
                    assert!(report.guesses() >= 1);
                    assert_eq!(report.knowledge.mines(), board.mines());
                }
                Outcome::Lost(cell) => {
                    assert_eq!(cell, Cell::new(3, 4));
                    assert!(report.guesses() >= 1);
                }
                Outcome::Stuck => panic!("a consistent board never gets stuck"),
            }
        }
    }

    #[test]
    fn test_opening_on_a_zero_solves_board() {
        // Every clear cell not touching the mine is a 0, and they are all connected
        let board = Board::from_layout(
            "
            *...
            ....
            ....
            ",
        )
        .unwrap();

        let mut won = 0;
        for seed in 0..30 {
            let report = play(&board, &mut StdRng::seed_from_u64(seed)).unwrap();
            if report.outcome == Outcome::Won {
                won += 1;
                assert_eq!(report.knowledge.mines(), board.mines());
                assert!(report.moves.len() <= 11);
            }

            // Opening on a 0 solves everything else without guessing
            let opening = report.moves[0];
            if board.nearby_mines(opening.cell()) == 0 && !board.is_mine(opening.cell()) {
                assert_eq!(report.outcome, Outcome::Won);
                assert_eq!(report.guesses(), 1);
            }
        }
        assert!(won > 0);
    }

    #[test]
    fn test_observer_sees_every_safe_reveal() {
        // The observer runs once per revealed cell, after it is recorded
        let board = Board::from_layout(
            "
            *...
            ....
            ....
            ",
        )
        .unwrap();

        for seed in 0..10 {
            let mut seen = Vec::new();
            let report = play_observed(&board, &mut StdRng::seed_from_u64(seed), |next, kb| {
                assert!(kb.moves_made().contains(&next.cell()));
                seen.push(next);
            })
            .unwrap();

            match report.outcome {
                Outcome::Lost(_) => assert_eq!(seen.len() + 1, report.moves.len()),
                _ => assert_eq!(seen, report.moves),
            }
        }
    }

    #[test]
    fn test_mine_free_board() {
        // With no mines there is nothing to find
        let board = Board::from_layout("...\n...").unwrap();
        let report = play(&board, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(report.outcome, Outcome::Won);
        assert!(report.moves.is_empty());
    }
}
