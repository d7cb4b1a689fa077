//! Drag gesture state machine and swap validation.
//!
//! Mirrors the browser drag sequence: `dragstart` on the source cell, `drop`
//! on the target cell, `dragend` back on the source. The machine only records
//! cells; deciding what a completed gesture does is up to the caller.

use thiserror::Error;

use crate::config::{CELL_COUNT, WIDTH};
use crate::grid::Grid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: usize,
    },
    Dropped {
        source: usize,
        target: usize,
    },
}

impl DragState {
    pub fn drag_start(self, source: usize) -> Self {
        DragState::Dragging { source }
    }

    /// A drop with no drag in progress is ignored.
    pub fn drop_on(self, target: usize) -> Self {
        match self {
            DragState::Idle => DragState::Idle,
            DragState::Dragging { source } | DragState::Dropped { source, .. } => {
                DragState::Dropped { source, target }
            }
        }
    }

    /// Finish the gesture. Returns the recorded pair if both ends were seen;
    /// the machine is back to `Idle` either way.
    pub fn drag_end(self) -> (Self, Option<(usize, usize)>) {
        match self {
            DragState::Dropped { source, target } => (DragState::Idle, Some((source, target))),
            _ => (DragState::Idle, None),
        }
    }
}

/// Why a candidate swap was refused. Logged, never shown to the player.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SwapRejection {
    #[error("cell index {0} is off the board")]
    OutOfBounds(usize),
    #[error("cells {0} and {1} are not neighbours")]
    NotAdjacent(usize, usize),
    #[error("cells {0} and {1} sit on different rows")]
    CrossesRow(usize, usize),
    #[error("board is still resolving")]
    Busy,
}

/// Accept only orthogonal neighbours: same-row ±1 or ±WIDTH.
pub fn check_swap(source: usize, target: usize) -> Result<(), SwapRejection> {
    for idx in [source, target] {
        if idx >= CELL_COUNT {
            return Err(SwapRejection::OutOfBounds(idx));
        }
    }
    let diff = source.abs_diff(target);
    if diff == 1 {
        if Grid::row_of(source) != Grid::row_of(target) {
            return Err(SwapRejection::CrossesRow(source, target));
        }
        return Ok(());
    }
    if diff == WIDTH {
        return Ok(());
    }
    Err(SwapRejection::NotAdjacent(source, target))
}
