//! The cell value, the board contract shared by every backend, and the
//! errors a backend can surface.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::snapshot::CellGrid;

/// The two-valued state of a single grid cell.
///
/// The discriminants are the wire encoding: the record store persists a cell
/// as the integer `0` or `1` so that neighbor sums can be computed with a
/// plain `$sum` aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// An unoccupied cell, encoded as `0`.
    #[default]
    Dead = 0,
    /// An occupied cell, encoded as `1`.
    Live = 1,
}

impl Cell {
    /// whether this cell is live
    pub fn is_live(&self) -> bool {
        matches!(self, Cell::Live)
    }
}

impl From<bool> for Cell {
    fn from(live: bool) -> Self {
        if live {
            Cell::Live
        } else {
            Cell::Dead
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i32::deserialize(deserializer)? {
            0 => Ok(Cell::Dead),
            1 => Ok(Cell::Live),
            other => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Signed(other as i64),
                &"a cell encoded as 0 or 1",
            )),
        }
    }
}

/// Errors surfaced by board operations.
///
/// Out-of-range coordinates are not represented here: they are precondition
/// violations and panic. Every variant propagates to the immediate caller
/// unchanged; no operation retries internally.
#[derive(Debug, Error)]
pub enum BoardError {
    /// A coordinate had no backing record in the store. Only the record
    /// backend can produce this; the array backend always has a slot for
    /// every coordinate.
    #[error("no cell record at ({x}, {y})")]
    NotFound {
        /// column of the missing record
        x: usize,
        /// row of the missing record
        y: usize,
    },
    /// The store failed at connection, query, or update time.
    #[error("storage failure")]
    Storage(#[from] mongodb::error::Error),
    /// A record came back from the store in a shape we could not decode.
    #[error("malformed cell record")]
    Decode(#[from] mongodb::bson::de::Error),
}

/// The polymorphic board contract.
///
/// Both backends implement exactly these five operations with identical
/// simulation semantics. The contract assumes single-threaded stepping: at
/// most one call is in flight per board at a time, and no internal locking
/// is provided.
pub trait Board {
    /// Returns the current state of the addressed cell.
    fn cell(&self, x: usize, y: usize) -> Result<Cell, BoardError>;

    /// Sets the cell's state, replacing any previous value.
    fn set(&mut self, x: usize, y: usize, cell: Cell) -> Result<(), BoardError>;

    /// Returns the full grid as one dense, linear-index-ordered copy.
    ///
    /// Backends without an atomic bulk read build this from per-record
    /// reads; it is not atomic with respect to concurrent writers.
    fn snapshot(&self) -> Result<CellGrid, BoardError>;

    /// Advances the grid by exactly one generation.
    ///
    /// Every neighbor lookup reads generation N state, including for cells
    /// already rewritten earlier in the same tick. On an `Err` the board's
    /// state is undefined: the transition may have partially applied and
    /// the session should be abandoned rather than retried.
    fn tick(&mut self) -> Result<(), BoardError>;

    /// Relinquishes backend resources. Consumes the board, so it can only
    /// ever happen once.
    fn release(self) -> Result<(), BoardError>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_wire_encoding() {
        assert_eq!(Cell::Dead as i32, 0);
        assert_eq!(Cell::Live as i32, 1);
    }

    #[test]
    fn test_cell_from_bool() {
        assert_eq!(Cell::from(true), Cell::Live);
        assert_eq!(Cell::from(false), Cell::Dead);
        assert!(Cell::Live.is_live());
        assert!(!Cell::Dead.is_live());
    }

    #[test]
    fn test_cell_round_trips_through_bson() {
        let encoded = mongodb::bson::to_bson(&Cell::Live).unwrap();
        assert_eq!(encoded, mongodb::bson::Bson::Int32(1));
        let encoded = mongodb::bson::to_bson(&Cell::Dead).unwrap();
        assert_eq!(encoded, mongodb::bson::Bson::Int32(0));

        let live: Cell = mongodb::bson::from_bson(mongodb::bson::Bson::Int32(1)).unwrap();
        assert_eq!(live, Cell::Live);
        let dead: Cell = mongodb::bson::from_bson(mongodb::bson::Bson::Int32(0)).unwrap();
        assert_eq!(dead, Cell::Dead);

        let bad: Result<Cell, _> = mongodb::bson::from_bson(mongodb::bson::Bson::Int32(7));
        assert!(bad.is_err());
    }
}
