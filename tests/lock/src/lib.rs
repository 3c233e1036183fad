//! Shared problem instances for the lock tests and the fixture binary.

use hdastar_harness::worlds::grid::{Cell, WeightedGrid};
use hdastar_harness::worlds::sliding_tile::{SlidingTile, TileState};

/// Seeds of the 8-puzzle instances used across tests.
pub const EIGHT_PUZZLE_SEEDS: [u64; 5] = [1, 2, 3, 5, 8];

/// Scramble depth of those instances.
pub const EIGHT_PUZZLE_SCRAMBLE: usize = 40;

/// Buffer large enough that no test instance comes near it.
pub const ROOMY_BUFFER: usize = 64 << 20;

/// The 3×3 board with the default Zobrist table.
///
/// # Panics
///
/// Never: 3×3 is a valid board.
#[must_use]
pub fn eight_puzzle() -> SlidingTile {
    SlidingTile::new(3, 3).expect("3x3 board is valid")
}

#[must_use]
pub fn eight_puzzle_instances(world: &SlidingTile) -> Vec<TileState> {
    EIGHT_PUZZLE_SEEDS
        .iter()
        .map(|&seed| world.scramble(seed, EIGHT_PUZZLE_SCRAMBLE))
        .collect()
}

/// Row-major weights of a 12×12 grid with a wall down column 5 that is
/// open only in the first and last rows.
#[must_use]
pub fn walled_grid_weights() -> Vec<Vec<u32>> {
    (0..12u32)
        .map(|r| {
            (0..12u32)
                .map(|c| {
                    if c == 5 && r != 0 && r != 11 {
                        0
                    } else {
                        1 + (r * 7 + c * 3) % 5
                    }
                })
                .collect()
        })
        .collect()
}

/// The walled grid with the goal in the far corner, and its start cell.
///
/// # Panics
///
/// Never: the corners are open.
#[must_use]
pub fn walled_grid() -> (WeightedGrid, Cell) {
    let grid = WeightedGrid::new(&walled_grid_weights(), Cell { row: 11, col: 11 })
        .expect("walled grid is valid");
    (grid, Cell { row: 0, col: 0 })
}
