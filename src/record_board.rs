//! The persistent backend: one MongoDB record per coordinate.
//!
//! The store has no "compute over a snapshot and publish atomically"
//! primitive, so a tick simulates the array backend's double buffer with
//! three phases: copy the whole collection to a scratch collection, evaluate
//! every coordinate against the untouched original and write changed cells
//! into the scratch copy, then drop the original and materialize the scratch
//! copy in its place. Each remote operation carries its own short timeout;
//! nothing is retried, and a failed phase leaves the board undefined.
use std::fmt;
use std::time::Duration;

use itertools::iproduct;
use mongodb::bson::{doc, Document};
use mongodb::options::{
    AggregateOptions, ClientOptions, FindOneOptions, FindOptions, IndexOptions, ServerAddress,
};
use mongodb::sync::{Client, Collection, Database};
use mongodb::IndexModel;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::grid::{self, BOARD_AREA, BOARD_HEIGHT, BOARD_WIDTH};
use crate::snapshot::CellGrid;
use crate::types::{Board, BoardError, Cell};

const STORE_HOST: &str = "localhost";
const STORE_PORT: u16 = 27017;
const DATABASE_NAME: &str = "gameOfLife";
const COLLECTION_NAME: &str = "gameOfLife";
const SCRATCH_NAME: &str = "scratch";

/// Bound on each individual remote operation. Tick latency degrades
/// linearly in [`BOARD_AREA`] on a slow store; no bound covers a whole
/// generation.
const OP_TIMEOUT: Duration = Duration::from_secs(1);

/// One persisted cell: its coordinate and its current value.
///
/// `coordinate` serializes as a two-element array, addressed in queries as
/// `coordinate.0` / `coordinate.1`, with a unique compound index keeping one
/// record per coordinate.
#[derive(Debug, Serialize, Deserialize)]
struct CellRecord {
    coordinate: (i32, i32),
    cell: Cell,
}

impl CellRecord {
    fn new(x: usize, y: usize, cell: Cell) -> Self {
        Self {
            coordinate: (x as i32, y as i32),
            cell,
        }
    }

    fn coordinate(&self) -> (usize, usize) {
        let (x, y) = self.coordinate;
        debug_assert!((0..BOARD_WIDTH as i32).contains(&x));
        debug_assert!((0..BOARD_HEIGHT as i32).contains(&y));
        (x as usize, y as usize)
    }
}

#[derive(Debug, Deserialize)]
struct NeighborSum {
    sum: i32,
}

fn coordinate_filter(x: usize, y: usize) -> Document {
    doc! { "coordinate.0": x as i32, "coordinate.1": y as i32 }
}

fn aggregate_options() -> AggregateOptions {
    AggregateOptions::builder().max_time(OP_TIMEOUT).build()
}

/// A board whose cells are individually addressable records in an external
/// MongoDB collection.
///
/// Construction wipes any prior collection state; release leaves the final
/// generation behind for external inspection.
pub struct RecordBoard {
    client: Client,
    database: Database,
    collection: Collection<CellRecord>,
}

impl fmt::Debug for RecordBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBoard")
            .field("collection", &self.collection.namespace())
            .finish()
    }
}

impl RecordBoard {
    /// Connects to the store, clears any prior state, enforces the one
    /// record per coordinate constraint, and seeds all [`BOARD_AREA`]
    /// records from a seeded RNG.
    pub fn connect(seed: u64) -> Result<Self, BoardError> {
        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: STORE_HOST.to_string(),
            port: Some(STORE_PORT),
        }];
        options.connect_timeout = Some(OP_TIMEOUT);
        options.server_selection_timeout = Some(OP_TIMEOUT);

        let client = Client::with_options(options)?;
        let database = client.database(DATABASE_NAME);
        database.run_command(doc! { "ping": 1 }, None)?;
        database.drop(None)?;

        let collection = database.collection::<CellRecord>(COLLECTION_NAME);
        collection.create_index(
            IndexModel::builder()
                .keys(doc! { "coordinate.0": 1, "coordinate.1": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            None,
        )?;

        let mut rng = SmallRng::seed_from_u64(seed);
        let records = iproduct!(0..BOARD_WIDTH, 0..BOARD_HEIGHT)
            .map(|(x, y)| CellRecord::new(x, y, rng.gen::<bool>().into()))
            .collect::<Vec<_>>();
        collection.insert_many(records, None)?;

        debug!(database = DATABASE_NAME, "record board seeded");
        Ok(Self {
            client,
            database,
            collection,
        })
    }

    /// Sum of the 8 toroidal neighbors' live counts, aggregated in the
    /// store over the frozen generation.
    fn neighbor_sum(&self, x: usize, y: usize) -> Result<usize, BoardError> {
        let neighbor_filters = grid::neighbors(x, y)
            .map(|(nx, ny)| coordinate_filter(nx, ny))
            .collect::<Vec<_>>();

        let mut cursor = self.collection.aggregate(
            [
                doc! { "$match": { "$or": neighbor_filters } },
                doc! { "$group": { "_id": null, "sum": { "$sum": "$cell" } } },
            ],
            aggregate_options(),
        )?;

        let row = cursor.next().ok_or(BoardError::NotFound { x, y })??;
        let row: NeighborSum = mongodb::bson::from_document(row)?;
        Ok(row.sum as usize)
    }
}

impl Board for RecordBoard {
    fn cell(&self, x: usize, y: usize) -> Result<Cell, BoardError> {
        debug_assert!(x < BOARD_WIDTH && y < BOARD_HEIGHT);

        let options = FindOneOptions::builder().max_time(OP_TIMEOUT).build();
        let record = self.collection.find_one(coordinate_filter(x, y), options)?;
        record
            .map(|record| record.cell)
            .ok_or(BoardError::NotFound { x, y })
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) -> Result<(), BoardError> {
        debug_assert!(x < BOARD_WIDTH && y < BOARD_HEIGHT);

        self.collection.update_one(
            coordinate_filter(x, y),
            doc! { "$set": { "cell": cell as i32 } },
            None,
        )?;
        Ok(())
    }

    fn snapshot(&self) -> Result<CellGrid, BoardError> {
        let options = FindOptions::builder().max_time(OP_TIMEOUT).build();
        let mut cell_grid = CellGrid::default();
        let mut seen = [false; BOARD_AREA];

        for record in self.collection.find(None, options)? {
            let record = record?;
            let (x, y) = record.coordinate();
            cell_grid.set(x, y, record.cell);
            seen[grid::index(x, y)] = true;
        }

        if let Some(missing) = seen.iter().position(|present| !present) {
            return Err(BoardError::NotFound {
                x: missing % BOARD_WIDTH,
                y: missing / BOARD_WIDTH,
            });
        }
        Ok(cell_grid)
    }

    /// Copy, mutate-on-copy, swap.
    ///
    /// Phase 2 reads sums and current values only from the original
    /// collection, which nothing writes to until phase 3, so later
    /// coordinates never observe already-updated neighbors. Cells the rule
    /// leaves unchanged are not written at all.
    #[instrument(level = "trace", skip_all)]
    fn tick(&mut self) -> Result<(), BoardError> {
        self.collection
            .aggregate([doc! { "$out": SCRATCH_NAME }], aggregate_options())?;
        let scratch = self.database.collection::<CellRecord>(SCRATCH_NAME);
        debug!("generation copied to scratch");

        for (x, y) in iproduct!(0..BOARD_WIDTH, 0..BOARD_HEIGHT) {
            let live_neighbors = self.neighbor_sum(x, y)?;
            let current = self.cell(x, y)?;
            let next = grid::next_state(current, live_neighbors);
            if next != current {
                scratch.update_one(
                    coordinate_filter(x, y),
                    doc! { "$set": { "cell": next as i32 } },
                    None,
                )?;
            }
        }
        debug!("scratch holds the next generation");

        self.collection.drop(None)?;
        scratch.aggregate([doc! { "$out": COLLECTION_NAME }], aggregate_options())?;
        Ok(())
    }

    /// Terminates the connection. The collection keeps the final
    /// generation; nothing is cleaned up.
    fn release(self) -> Result<(), BoardError> {
        self.client.shutdown();
        Ok(())
    }
}

// These tests need a reachable mongod on localhost:27017 and each one
// re-seeds the same database, so run them one at a time:
//
//     cargo test -- --ignored --test-threads=1
#[cfg(test)]
mod tests {
    use super::*;
    use crate::array_board::ArrayBoard;

    fn board_with_live(live: &[(usize, usize)]) -> RecordBoard {
        let mut board = RecordBoard::connect(0).expect("requires a local mongod");
        let fixture = CellGrid::from_live_cells(live);
        for (x, y) in iproduct!(0..BOARD_WIDTH, 0..BOARD_HEIGHT) {
            board.set(x, y, fixture.get(x, y)).unwrap();
        }
        board
    }

    #[test]
    #[ignore]
    fn test_write_then_read_round_trips() {
        let mut board = board_with_live(&[]);
        for (x, y) in [(0, 0), (BOARD_WIDTH - 1, BOARD_HEIGHT - 1), (3, 7)] {
            for cell in [Cell::Live, Cell::Dead] {
                board.set(x, y, cell).unwrap();
                assert_eq!(board.cell(x, y).unwrap(), cell);
            }
        }
        board.release().unwrap();
    }

    #[test]
    #[ignore]
    fn test_tick_transition_table() {
        let cases: Vec<(&[(usize, usize)], &[(usize, usize)])> = vec![
            (&[(0, 0)], &[]),
            (
                &[(0, 0), (1, 0), (0, 1), (1, 1)],
                &[(0, 0), (1, 0), (0, 1), (1, 1)],
            ),
            (
                &[(0, 0), (1, 0), (2, 0)],
                &[(1, 0), (1, 1), (1, BOARD_HEIGHT - 1)],
            ),
        ];

        for (initial, expected) in cases {
            let mut board = board_with_live(initial);
            board.tick().unwrap();
            assert_eq!(
                board.snapshot().unwrap(),
                CellGrid::from_live_cells(expected),
                "starting from {initial:?}"
            );
            board.release().unwrap();
        }
    }

    #[test]
    #[ignore]
    fn test_matches_array_board_over_many_generations() {
        let fixture: &[(usize, usize)] = &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2), (7, 7)];
        let mut record_board = board_with_live(fixture);
        let mut array_board = ArrayBoard::from_grid(CellGrid::from_live_cells(fixture));

        for generation in 0..5 {
            assert_eq!(
                record_board.snapshot().unwrap(),
                array_board.snapshot().unwrap(),
                "generation {generation}"
            );
            record_board.tick().unwrap();
            array_board.tick().unwrap();
        }
        record_board.release().unwrap();
    }
}
