//! Shared instances for the hdastar benchmark suites.

use hdastar_harness::worlds::sliding_tile::{SlidingTile, TileState};
use hdastar_kernel::carrier::packed::PackedState;
use hdastar_search::node::SearchNode;

/// Send buffer large enough that no benchmark run exhausts it.
pub const BENCH_BUFFER: usize = 256 << 20;

/// A named sliding-tile instance.
pub struct Regime {
    pub name: &'static str,
    pub world: SlidingTile,
    pub root: TileState,
}

/// 8-puzzle scrambles of increasing depth.
///
/// # Panics
///
/// Never: 3×3 is a valid board.
#[must_use]
pub fn eight_puzzle_regimes() -> Vec<Regime> {
    [("shallow", 11u64, 12usize), ("medium", 23, 40), ("deep", 37, 200)]
        .into_iter()
        .map(|(name, seed, moves)| {
            let world = SlidingTile::new(3, 3).expect("3x3 board is valid");
            let root = world.scramble(seed, moves);
            Regime { name, world, root }
        })
        .collect()
}

/// `n` nodes with distinct states and a spread of `f` values.
#[must_use]
pub fn synthetic_nodes(n: u32, payload_len: usize) -> Vec<SearchNode> {
    (0..n)
        .map(|i| {
            let mut bytes = vec![0u8; payload_len.max(4)];
            bytes[..4].copy_from_slice(&i.to_be_bytes());
            let g = i.wrapping_mul(2_654_435_761) % 97;
            SearchNode::new(PackedState::new(bytes), g, i % 13, i, Some(0))
        })
        .collect()
}
