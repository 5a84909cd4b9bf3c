use std::collections::BTreeSet;

use crate::Cell;

/// The hidden side of the game: where the mines are.
///
/// The knowledge base never sees this. It only learns what
/// [`nearby_mines`](Board::nearby_mines) reports for cells it reveals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    height: usize,
    width: usize,
    mines: BTreeSet<Cell>,
}

impl Board {
    /// Builds a board from explicit mine positions.
    pub fn new(height: usize, width: usize, mines: impl IntoIterator<Item = Cell>) -> anyhow::Result<Self> {
        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        if let Some(cell) = mines.iter().find(|c| !c.in_bounds(height, width)) {
            anyhow::bail!("mine {cell} is outside the {height}x{width} board");
        }
        Ok(Board {
            height,
            width,
            mines,
        })
    }

    /// Parses a text layout with one line per row, `*` for a mine and `.`
    /// for a clear cell. Blank lines and surrounding whitespace are ignored.
    pub fn from_layout(layout: &str) -> anyhow::Result<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut mines = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                anyhow::bail!("row {row} has {} cells, expected {width}", line.chars().count());
            }
            for (col, symbol) in line.chars().enumerate() {
                match symbol {
                    '*' => mines.push(Cell::new(row, col)),
                    '.' => {}
                    other => anyhow::bail!("unexpected {other:?} at row {row}, column {col}"),
                }
            }
        }

        Board::new(rows.len(), width, mines)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// The number of mines among the up-to-8 neighbors of `cell`.
    pub fn nearby_mines(&self, cell: Cell) -> u8 {
        cell.neighbors(self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count() as u8
    }

    /// The game is won once every mine has been found.
    pub fn won(&self, found: &BTreeSet<Cell>) -> bool {
        *found == self.mines
    }
}
