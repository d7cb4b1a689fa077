//! Clearing, gravity and refill.
//!
//! A resolution step is split in two so the front end can show the faded
//! cells for a moment: [`clear`] empties the matched cells and reports the
//! points, [`collapse`] later drops survivors and refills from the top. The
//! caller re-runs the match detector after each collapse to drive cascades.

use std::collections::BTreeSet;

use crate::config::WIDTH;
use crate::grid::{Cell, ColorSource, Grid};
use crate::matcher::find_matches;

/// Outcome of one clear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub cleared: usize,
    pub points: u32,
}

/// Empty every matched cell and return the award (`points_per_tile` each,
/// saturating at `u32::MAX`). An empty set is a no-op worth nothing.
pub fn clear(grid: &mut Grid, matched: &BTreeSet<usize>, points_per_tile: u32) -> ClearReport {
    for &idx in matched {
        grid.set(idx, Cell::Empty);
    }
    ClearReport {
        cleared: matched.len(),
        points: points_per_tile.saturating_mul(u32::try_from(matched.len()).unwrap_or(u32::MAX)),
    }
}

/// Per column, bottom to top: an empty cell pulls down the nearest filled cell
/// above it, or takes a fresh color when nothing is left above. Survivors keep
/// their relative order.
pub fn collapse(grid: &mut Grid, source: &mut dyn ColorSource) {
    for col in 0..WIDTH {
        for row in (0..WIDTH).rev() {
            let idx = Grid::index(row, col);
            if !grid.get(idx).is_empty() {
                continue;
            }
            let above = (0..row)
                .rev()
                .map(|r| Grid::index(r, col))
                .find(|&i| !grid.get(i).is_empty());
            match above {
                Some(from) => {
                    grid.set(idx, grid.get(from));
                    grid.set(from, Cell::Empty);
                }
                None => grid.set(idx, Cell::Filled(source.next_color())),
            }
        }
    }
}

/// Run clear/collapse cycles with no pauses until no run remains.
/// Returns one report per cycle (empty when the board was already quiet).
pub fn settle(grid: &mut Grid, source: &mut dyn ColorSource, points_per_tile: u32) -> Vec<ClearReport> {
    let mut reports = Vec::new();
    loop {
        let matched = find_matches(grid);
        if matched.is_empty() {
            return reports;
        }
        reports.push(clear(grid, &matched, points_per_tile));
        collapse(grid, source);
    }
}
