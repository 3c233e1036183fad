//! Search domains shipped with the harness.

pub mod explicit;
pub mod grid;
pub mod sliding_tile;

use thiserror::Error;

/// A world that cannot be built as described.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("invalid dimensions: {detail}")]
    InvalidDimensions { detail: String },
    #[error("not a permutation of the board: {detail}")]
    NotAPermutation { detail: String },
    #[error("board is not solvable")]
    Unsolvable,
    #[error("cell ({row}, {col}) is outside the grid or a wall")]
    BadCell { row: u16, col: u16 },
    #[error("unknown vertex {vertex}")]
    UnknownVertex { vertex: u32 },
}
