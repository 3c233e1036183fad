//! 4-connected weighted grid.
//!
//! Entering a cell costs that cell's weight; weight 0 is a wall. The
//! heuristic is Manhattan distance to the goal times the cheapest weight on
//! the grid, which keeps it admissible. States pack to `(row, col)` as two
//! big-endian `u16`; routing uses the default distribution hash.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_search::contract::{Edge, SearchDomain};
use hdastar_search::node::{Cost, Operator};

use super::WorldError;

pub const NORTH: Operator = 0;
pub const SOUTH: Operator = 1;
pub const WEST: Operator = 2;
pub const EAST: Operator = 3;

fn opposite(op: Operator) -> Operator {
    match op {
        NORTH => SOUTH,
        SOUTH => NORTH,
        WEST => EAST,
        _ => WEST,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
}

#[derive(Debug, Clone)]
pub struct WeightedGrid {
    rows: u16,
    cols: u16,
    weights: Vec<Cost>,
    goal: Cell,
    min_weight: Cost,
}

impl WeightedGrid {
    /// Build from row-major weights.
    ///
    /// # Errors
    ///
    /// [`WorldError::InvalidDimensions`] for an empty or ragged grid or one
    /// larger than `u16` allows; [`WorldError::BadCell`] if `goal` is
    /// outside the grid or a wall.
    pub fn new(weights: &[Vec<Cost>], goal: Cell) -> Result<Self, WorldError> {
        let rows = weights.len();
        let cols = weights.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 || weights.iter().any(|r| r.len() != cols) {
            return Err(WorldError::InvalidDimensions {
                detail: "grid must be non-empty and rectangular".into(),
            });
        }
        let (Ok(rows), Ok(cols)) = (u16::try_from(rows), u16::try_from(cols)) else {
            return Err(WorldError::InvalidDimensions {
                detail: format!("{rows}x{cols} grid exceeds u16 coordinates"),
            });
        };
        let flat: Vec<Cost> = weights.iter().flatten().copied().collect();
        let min_weight = flat.iter().copied().filter(|&w| w > 0).min().unwrap_or(0);
        let grid = Self {
            rows,
            cols,
            weights: flat,
            goal,
            min_weight,
        };
        if !grid.is_open(goal) {
            return Err(WorldError::BadCell {
                row: goal.row,
                col: goal.col,
            });
        }
        Ok(grid)
    }

    /// Uniform grid of `rows × cols` cells, every weight 1.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn open(rows: usize, cols: usize, goal: Cell) -> Result<Self, WorldError> {
        Self::new(&vec![vec![1; cols]; rows], goal)
    }

    /// # Errors
    ///
    /// [`WorldError::BadCell`] if `cell` is outside the grid or a wall.
    pub fn start(&self, cell: Cell) -> Result<Cell, WorldError> {
        if self.is_open(cell) {
            Ok(cell)
        } else {
            Err(WorldError::BadCell {
                row: cell.row,
                col: cell.col,
            })
        }
    }

    fn index(&self, cell: Cell) -> usize {
        usize::from(cell.row) * usize::from(self.cols) + usize::from(cell.col)
    }

    fn is_open(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols && self.weights[self.index(cell)] > 0
    }

    fn neighbour(&self, cell: Cell, op: Operator) -> Option<Cell> {
        let next = match op {
            NORTH => Cell {
                row: cell.row.checked_sub(1)?,
                col: cell.col,
            },
            SOUTH => Cell {
                row: cell.row + 1,
                col: cell.col,
            },
            WEST => Cell {
                row: cell.row,
                col: cell.col.checked_sub(1)?,
            },
            _ => Cell {
                row: cell.row,
                col: cell.col + 1,
            },
        };
        self.is_open(next).then_some(next)
    }
}

impl SearchDomain for WeightedGrid {
    type State = Cell;

    fn heuristic(&self, cell: &Cell) -> Cost {
        let manhattan = Cost::from(cell.row.abs_diff(self.goal.row))
            + Cost::from(cell.col.abs_diff(self.goal.col));
        manhattan * self.min_weight
    }

    fn pack(&self, cell: &Cell) -> PackedState {
        let mut bytes = Vec::with_capacity(4);
        bytes.extend_from_slice(&cell.row.to_be_bytes());
        bytes.extend_from_slice(&cell.col.to_be_bytes());
        PackedState::new(bytes)
    }

    fn unpack(&self, packed: &PackedState) -> Cell {
        match packed.as_bytes() {
            [r0, r1, c0, c1] => Cell {
                row: u16::from_be_bytes([*r0, *r1]),
                col: u16::from_be_bytes([*c0, *c1]),
            },
            _ => Cell { row: 0, col: 0 },
        }
    }

    fn operators(&self, cell: &Cell, out: &mut Vec<Operator>) {
        out.extend(
            [NORTH, SOUTH, WEST, EAST]
                .into_iter()
                .filter(|&op| self.neighbour(*cell, op).is_some()),
        );
    }

    fn apply(&self, cell: &mut Cell, op: Operator) -> Edge {
        // Only called with operators from `operators`, so the move is legal.
        let next = self.neighbour(*cell, op).unwrap_or(*cell);
        *cell = next;
        Edge {
            op,
            cost: self.weights[self.index(next)],
            inverse: Some(opposite(op)),
        }
    }

    fn undo(&self, cell: &mut Cell, edge: &Edge) {
        if let Some(prev) = self.neighbour(*cell, opposite(edge.op)) {
            *cell = prev;
        }
    }

    fn is_goal(&self, cell: &Cell) -> bool {
        *cell == self.goal
    }
}
