//! The in-memory backend: one flat buffer, double-buffered ticks.
use itertools::iproduct;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::instrument;

use crate::grid::{self, BOARD_AREA, BOARD_HEIGHT, BOARD_WIDTH};
use crate::snapshot::CellGrid;
use crate::types::{Board, BoardError, Cell};

/// A board whose cells live in one fixed-size in-process buffer, ordered by
/// [`grid::index`].
///
/// No operation on this backend can fail; out-of-range coordinates are a
/// precondition violation and panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayBoard {
    cells: [Cell; BOARD_AREA],
}

impl ArrayBoard {
    /// A board with every cell drawn independently from a seeded RNG.
    ///
    /// The seed is explicit so tests can be deterministic; call sites that
    /// want a fresh board each run pass a time-derived value.
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut cells = [Cell::Dead; BOARD_AREA];
        for cell in cells.iter_mut() {
            *cell = rng.gen::<bool>().into();
        }
        Self { cells }
    }

    /// A board starting from a fixed configuration.
    pub fn from_grid(cell_grid: CellGrid) -> Self {
        Self {
            cells: *cell_grid.cells(),
        }
    }
}

impl Board for ArrayBoard {
    fn cell(&self, x: usize, y: usize) -> Result<Cell, BoardError> {
        Ok(self.cells[grid::index(x, y)])
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) -> Result<(), BoardError> {
        self.cells[grid::index(x, y)] = cell;
        Ok(())
    }

    fn snapshot(&self) -> Result<CellGrid, BoardError> {
        Ok(CellGrid::from_cells(self.cells))
    }

    /// Double-buffer advance: every next state is computed against the old
    /// buffer and written into a copy, so no lookup ever observes a cell
    /// already rewritten in the same tick. The copy then becomes the live
    /// buffer.
    #[instrument(level = "trace", skip_all)]
    fn tick(&mut self) -> Result<(), BoardError> {
        let mut next = self.cells;
        for (x, y) in iproduct!(0..BOARD_WIDTH, 0..BOARD_HEIGHT) {
            let live_neighbors = grid::neighbors(x, y)
                .filter(|&(nx, ny)| self.cells[grid::index(nx, ny)].is_live())
                .count();
            next[grid::index(x, y)] = grid::next_state(self.cells[grid::index(x, y)], live_neighbors);
        }
        self.cells = next;
        Ok(())
    }

    fn release(self) -> Result<(), BoardError> {
        Ok(())
    }
}
