//! Grid dimensions, the coordinate-to-linear-index bijection, toroidal
//! neighbor addressing, and the one transition-rule function every backend
//! shares.
//!
//! Wraparound is computed coordinate-wise: each axis wraps independently, so
//! stepping left from column 0 lands in column `BOARD_WIDTH - 1` of the
//! *same* row. Flat-index modulo arithmetic would silently cross into the
//! adjacent row there and is deliberately not used.
use itertools::iproduct;

use crate::types::Cell;

/// Number of columns. Fixed at compile time; both backends in a deployment
/// share it.
pub const BOARD_WIDTH: usize = 10;

/// Number of rows. Fixed at compile time.
pub const BOARD_HEIGHT: usize = 10;

/// Total cell count, and the length of every dense buffer and snapshot.
pub const BOARD_AREA: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// Converts a coordinate to its linear index, `y * BOARD_WIDTH + x`.
///
/// This ordering is shared by every dense buffer in the crate and by the
/// snapshot type, so snapshots from different backends compare elementwise.
pub fn index(x: usize, y: usize) -> usize {
    debug_assert!(x < BOARD_WIDTH && y < BOARD_HEIGHT);

    y * BOARD_WIDTH + x
}

/// Wraps one axis value onto `0..max`.
pub fn wrap(value: i32, max: usize) -> usize {
    value.rem_euclid(max as i32) as usize
}

/// The 8 toroidal neighbors of a coordinate, each axis wrapped
/// independently.
pub fn neighbors(x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
    debug_assert!(x < BOARD_WIDTH && y < BOARD_HEIGHT);

    iproduct!(-1i32..=1, -1i32..=1)
        .filter(|&offset| offset != (0, 0))
        .map(move |(dx, dy)| {
            (
                wrap(x as i32 + dx, BOARD_WIDTH),
                wrap(y as i32 + dy, BOARD_HEIGHT),
            )
        })
}

/// Applies the Game of Life transition rule to one cell.
///
/// Fewer than 2 or more than 3 live neighbors kills the cell, a dead cell
/// with exactly 3 live neighbors is born, and everything else is left
/// unchanged. Both backends call this with neighbor sums taken from the
/// frozen previous generation, which is the entirety of the simulation
/// semantics they have to agree on.
pub fn next_state(cell: Cell, live_neighbors: usize) -> Cell {
    match (cell, live_neighbors) {
        (_, n) if !(2..=3).contains(&n) => Cell::Dead,
        (Cell::Dead, 3) => Cell::Live,
        (current, _) => current,
    }
}
