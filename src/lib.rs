#![deny(
    warnings,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs
)]
//! Conway's Game of Life on a fixed-size toroidal grid, built around a
//! storage-agnostic [`types::Board`] contract. The same five operations
//! (point read, point write, bulk snapshot, generation tick, release) are
//! implemented by two materially different backends:
//!
//! * [`array_board::ArrayBoard`] keeps every cell in one flat in-process
//!   buffer and advances generations with a double-buffer swap.
//! * [`record_board::RecordBoard`] keeps one record per coordinate in a
//!   MongoDB collection and advances generations with a copy, mutate-on-copy,
//!   swap protocol, the remote equivalent of the double buffer.
//!
//! Both backends route every neighbor lookup and every transition decision
//! through [`grid`], so a fixed starting configuration stepped the same
//! number of times reports an identical [`snapshot::CellGrid`] from either.

pub mod array_board;
pub mod grid;
pub mod record_board;
pub mod snapshot;
pub mod types;
