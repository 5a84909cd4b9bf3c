//! SAT cross-check for the propagation engine.
//!
//! Every observation in a knowledge base is encoded as an exactly-k
//! constraint over its neighbors. A cell is forced to a value when the
//! opposite assumption is unsatisfiable; every conclusion the engine draws
//! must be forced.

use itertools::Itertools;
use std::collections::HashMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::{Board, Cell, KnowledgeBase};

pub struct Oracle {
    solver: Solver<'static>,
    vars: HashMap<Cell, Var>,
}

impl Oracle {
    pub fn new(knowledge: &KnowledgeBase, board: &Board) -> Self {
        let (height, width) = (knowledge.height(), knowledge.width());
        let mut solver = Solver::new();
        let vars: HashMap<Cell, Var> = Cell::all(height, width)
            .map(|cell| (cell, solver.new_var()))
            .collect();
        let mine = |cell: &Cell| Lit::from_var(vars[cell], true);

        let mut formula = CnfFormula::new();
        for cell in knowledge.moves_made() {
            formula.add_clause(&[!mine(cell)]);
            let lits = cell
                .neighbors(height, width)
                .map(|neighbor| mine(&neighbor))
                .collect_vec();
            encode_exactly_k(&mut formula, &lits, board.nearby_mines(*cell) as usize);
        }
        solver.add_formula(&formula);

        Oracle { solver, vars }
    }

    /// Whether every assignment consistent with the observations agrees
    /// that `cell` is (`mine == true`) or is not a mine.
    pub fn is_forced(&mut self, cell: Cell, mine: bool) -> bool {
        let opposite = Lit::from_var(self.vars[&cell], !mine);
        self.solver.assume(&[opposite]);
        let satisfiable = self.solver.solve().expect("solver failure");
        self.solver.assume(&[]);
        !satisfiable
    }
}

/// Naive exactly-k encoding; fine for the at most 8 literals of a neighborhood.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    if k > lits.len() {
        formula.add_clause(&[]);
        return;
    }
    // At most k: any k + 1 of them contain a non-mine.
    for combo in lits.iter().copied().combinations(k + 1) {
        formula.add_clause(&combo.iter().map(|&lit| !lit).collect_vec());
    }
    // At least k: any n - k + 1 of them contain a mine.
    for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
        formula.add_clause(&combo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_oracle_on_known_position() {
        // A '2' between two cells on a 1x3 board forces both mines
        let board = Board::from_layout("*.*").unwrap();
        let mut kb = KnowledgeBase::new(1, 3);
        kb.record_observation(Cell::new(0, 1), 2).unwrap();

        let mut oracle = Oracle::new(&kb, &board);
        assert!(oracle.is_forced(Cell::new(0, 0), true));
        assert!(oracle.is_forced(Cell::new(0, 2), true));
        assert!(oracle.is_forced(Cell::new(0, 1), false));
        assert!(!oracle.is_forced(Cell::new(0, 0), false));
    }

    #[test]
    fn test_engine_conclusions_are_entailed() {
        // After every reveal, each safe cell and mine the engine claims must be
        // forced by the observations alone
        let layouts = [
            "
            ..*....
            .......
            *..*...
            ....*..
            .......
            .*...*.
            ",
            "
            ......
            .**...
            ......
            ...*..
            *.....
            ",
            "
            *.*.*
            .....
            *.*.*
            ",
        ];

        for (i, layout) in layouts.iter().enumerate() {
            let board = Board::from_layout(layout).unwrap();
            for seed in 0..4 {
                let mut rng = StdRng::seed_from_u64(seed * 31 + i as u64);
                let mut kb = KnowledgeBase::new(board.height(), board.width());

                while let Some(next) = kb.next_move(&mut rng) {
                    let cell = next.cell();
                    if board.is_mine(cell) || board.won(kb.mines()) {
                        break;
                    }
                    kb.record_observation(cell, board.nearby_mines(cell) as usize)
                        .unwrap();

                    let mut oracle = Oracle::new(&kb, &board);
                    for &safe in kb.safe() {
                        assert!(oracle.is_forced(safe, false), "{safe} is not forced safe");
                    }
                    for &mine in kb.mines() {
                        assert!(oracle.is_forced(mine, true), "{mine} is not forced mine");
                    }
                }
            }
        }
    }
}
