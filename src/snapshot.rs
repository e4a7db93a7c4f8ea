//! The dense, order-defined snapshot of an entire generation.
use std::fmt;

use crate::grid::{self, BOARD_AREA, BOARD_HEIGHT, BOARD_WIDTH};
use crate::types::Cell;

/// A point-in-time copy of every cell, ordered by [`grid::index`].
///
/// Snapshots are how backends are compared: two boards stepped identically
/// must produce equal `CellGrid`s regardless of where their cells live. The
/// all-dead grid is `Default`, and [`CellGrid::from_live_cells`] builds test
/// fixtures from a list of live coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrid {
    cells: [Cell; BOARD_AREA],
}

impl Default for CellGrid {
    fn default() -> Self {
        Self {
            cells: [Cell::Dead; BOARD_AREA],
        }
    }
}

impl CellGrid {
    /// An all-dead grid with the given coordinates set live.
    pub fn from_live_cells(live: &[(usize, usize)]) -> Self {
        let mut cell_grid = Self::default();
        for &(x, y) in live {
            cell_grid.set(x, y, Cell::Live);
        }
        cell_grid
    }

    /// A grid wrapping an already-ordered dense buffer.
    pub fn from_cells(cells: [Cell; BOARD_AREA]) -> Self {
        Self { cells }
    }

    /// The state of one cell.
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[grid::index(x, y)]
    }

    /// Overwrites one cell.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[grid::index(x, y)] = cell;
    }

    /// The underlying dense buffer, in linear-index order.
    pub fn cells(&self) -> &[Cell; BOARD_AREA] {
        &self.cells
    }
}

impl fmt::Display for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                if self.get(x, y).is_live() {
                    write!(f, "#")?;
                } else {
                    write!(f, ".")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_dead() {
        let cell_grid = CellGrid::default();
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                assert_eq!(cell_grid.get(x, y), Cell::Dead);
            }
        }
    }

    #[test]
    fn test_from_live_cells_places_by_coordinate() {
        let cell_grid = CellGrid::from_live_cells(&[(0, 0), (3, 2)]);
        assert_eq!(cell_grid.get(0, 0), Cell::Live);
        assert_eq!(cell_grid.get(3, 2), Cell::Live);
        assert_eq!(cell_grid.get(2, 3), Cell::Dead);

        // linear-index ordering: (3, 2) lands at 2 * BOARD_WIDTH + 3
        assert_eq!(cell_grid.cells()[2 * BOARD_WIDTH + 3], Cell::Live);
    }

    #[test]
    fn test_display_draws_rows() {
        let rendered = CellGrid::from_live_cells(&[(1, 0)]).to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next().unwrap(), ".#........");
        for line in lines {
            assert_eq!(line, "..........");
        }
    }
}
