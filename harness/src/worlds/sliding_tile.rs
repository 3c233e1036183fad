//! Sliding-tile puzzle (8-puzzle, 15-puzzle, and other W×H boards).
//!
//! The goal places tile `i` in cell `i`, blank (tile 0) top-left. Operators
//! move the blank; every move costs 1. States pack to one byte per cell.
//! The distribution hash is Zobrist over (cell, tile) pairs, drawn from a
//! seeded generator so every worker builds the same table.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_search::contract::{Edge, SearchDomain};
use hdastar_search::node::{Cost, Operator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::WorldError;

/// Seed of the default Zobrist table.
pub const DEFAULT_ZOBRIST_SEED: u64 = 0x5EED_7113;

pub const UP: Operator = 0;
pub const DOWN: Operator = 1;
pub const LEFT: Operator = 2;
pub const RIGHT: Operator = 3;

fn inverse(op: Operator) -> Operator {
    match op {
        UP => DOWN,
        DOWN => UP,
        LEFT => RIGHT,
        _ => LEFT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileState {
    tiles: Vec<u8>,
    blank: usize,
}

impl TileState {
    #[must_use]
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    #[must_use]
    pub fn blank(&self) -> usize {
        self.blank
    }
}

#[derive(Debug, Clone)]
pub struct SlidingTile {
    width: usize,
    height: usize,
    /// `zobrist[cell * cells + tile]`.
    zobrist: Vec<u32>,
}

impl SlidingTile {
    /// # Errors
    ///
    /// [`WorldError::InvalidDimensions`] unless both sides are at least 2 and
    /// the board has at most 255 cells.
    pub fn new(width: usize, height: usize) -> Result<Self, WorldError> {
        Self::with_seed(width, height, DEFAULT_ZOBRIST_SEED)
    }

    /// Like [`new`](Self::new) with an explicit Zobrist seed.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn with_seed(width: usize, height: usize, seed: u64) -> Result<Self, WorldError> {
        let cells = width * height;
        if width < 2 || height < 2 || cells > 255 {
            return Err(WorldError::InvalidDimensions {
                detail: format!("{width}x{height} board"),
            });
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let zobrist = (0..cells * cells).map(|_| rng.gen::<u32>()).collect();
        Ok(Self {
            width,
            height,
            zobrist,
        })
    }

    #[must_use]
    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    /// The solved board.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn goal(&self) -> TileState {
        TileState {
            tiles: (0..self.cells()).map(|t| t as u8).collect(),
            blank: 0,
        }
    }

    /// Board from a row-major tile listing, 0 for the blank.
    ///
    /// # Errors
    ///
    /// [`WorldError::NotAPermutation`] unless `tiles` holds each of
    /// `0..cells` exactly once.
    pub fn state_from_tiles(&self, tiles: &[u8]) -> Result<TileState, WorldError> {
        let cells = self.cells();
        let mut seen = vec![false; cells];
        if tiles.len() != cells {
            return Err(WorldError::NotAPermutation {
                detail: format!("{} tiles for {cells} cells", tiles.len()),
            });
        }
        for &t in tiles {
            let t = usize::from(t);
            if t >= cells || seen[t] {
                return Err(WorldError::NotAPermutation {
                    detail: format!("tile {t} out of range or repeated"),
                });
            }
            seen[t] = true;
        }
        let blank = tiles.iter().position(|&t| t == 0).unwrap_or(0);
        Ok(TileState {
            tiles: tiles.to_vec(),
            blank,
        })
    }

    /// Whether the goal is reachable from `state`.
    ///
    /// A board is solvable iff its permutation parity equals the parity of
    /// the blank's Manhattan distance from its goal cell.
    #[must_use]
    pub fn is_solvable(&self, state: &TileState) -> bool {
        let cells = self.cells();
        let mut visited = vec![false; cells];
        let mut cycles = 0;
        for start in 0..cells {
            if visited[start] {
                continue;
            }
            cycles += 1;
            let mut i = start;
            while !visited[i] {
                visited[i] = true;
                i = usize::from(state.tiles[i]);
            }
        }
        let permutation_parity = (cells - cycles) % 2;
        let (row, col) = (state.blank / self.width, state.blank % self.width);
        permutation_parity == (row + col) % 2
    }

    /// Random walk of `moves` blank moves from the goal, never undoing the
    /// previous move. Always solvable.
    #[must_use]
    pub fn scramble(&self, seed: u64, moves: usize) -> TileState {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = self.goal();
        let mut ops = Vec::with_capacity(4);
        let mut last: Option<Operator> = None;
        for _ in 0..moves {
            ops.clear();
            self.operators(&state, &mut ops);
            ops.retain(|&op| last != Some(op));
            let op = ops[rng.gen_range(0..ops.len())];
            last = self.apply(&mut state, op).inverse;
        }
        state
    }

    fn target(&self, blank: usize, op: Operator) -> usize {
        match op {
            UP => blank - self.width,
            DOWN => blank + self.width,
            LEFT => blank - 1,
            _ => blank + 1,
        }
    }
}

impl SearchDomain for SlidingTile {
    type State = TileState;

    #[allow(clippy::cast_possible_truncation)]
    fn heuristic(&self, state: &TileState) -> Cost {
        let mut total = 0;
        for (cell, &tile) in state.tiles.iter().enumerate() {
            if tile == 0 {
                continue;
            }
            let goal = usize::from(tile);
            total += (cell / self.width).abs_diff(goal / self.width)
                + (cell % self.width).abs_diff(goal % self.width);
        }
        total as Cost
    }

    fn pack(&self, state: &TileState) -> PackedState {
        PackedState::from_slice(&state.tiles)
    }

    fn unpack(&self, packed: &PackedState) -> TileState {
        let tiles = packed.as_bytes().to_vec();
        let blank = tiles.iter().position(|&t| t == 0).unwrap_or(0);
        TileState { tiles, blank }
    }

    fn operators(&self, state: &TileState, out: &mut Vec<Operator>) {
        let (row, col) = (state.blank / self.width, state.blank % self.width);
        if row > 0 {
            out.push(UP);
        }
        if row + 1 < self.height {
            out.push(DOWN);
        }
        if col > 0 {
            out.push(LEFT);
        }
        if col + 1 < self.width {
            out.push(RIGHT);
        }
    }

    fn apply(&self, state: &mut TileState, op: Operator) -> Edge {
        let target = self.target(state.blank, op);
        state.tiles.swap(state.blank, target);
        state.blank = target;
        Edge {
            op,
            cost: 1,
            inverse: Some(inverse(op)),
        }
    }

    fn undo(&self, state: &mut TileState, edge: &Edge) {
        let back = self.target(state.blank, inverse(edge.op));
        state.tiles.swap(state.blank, back);
        state.blank = back;
    }

    fn is_goal(&self, state: &TileState) -> bool {
        state
            .tiles
            .iter()
            .enumerate()
            .all(|(cell, &tile)| usize::from(tile) == cell)
    }

    fn distribution_hash(&self, state: &TileState, _packed: &PackedState) -> u32 {
        let cells = self.cells();
        state
            .tiles
            .iter()
            .enumerate()
            .fold(0, |acc, (cell, &tile)| acc ^ self.zobrist[cell * cells + usize::from(tile)])
    }
}
