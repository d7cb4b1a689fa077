//! Run detection over rows and columns.

use std::collections::BTreeSet;

use crate::config::{MIN_RUN, WIDTH};
use crate::grid::{Cell, Grid};

/// Indices of every cell that sits in a horizontal or vertical run of
/// `MIN_RUN` or more equal colors. A cell in both a row run and a column run
/// appears once. Empty cells never match.
pub fn find_matches(grid: &Grid) -> BTreeSet<usize> {
    let mut matched = BTreeSet::new();
    scan_rows(grid, &mut matched);
    scan_cols(grid, &mut matched);
    matched
}

fn scan_rows(grid: &Grid, out: &mut BTreeSet<usize>) {
    for row in 0..WIDTH {
        scan_line(grid, |k| Grid::index(row, k), out);
    }
}

fn scan_cols(grid: &Grid, out: &mut BTreeSet<usize>) {
    for col in 0..WIDTH {
        scan_line(grid, |k| Grid::index(k, col), out);
    }
}

/// Walk one line of `WIDTH` cells; `at(k)` maps the k-th position to a board index.
fn scan_line(grid: &Grid, at: impl Fn(usize) -> usize, out: &mut BTreeSet<usize>) {
    let mut k = 0;
    while k < WIDTH {
        let Cell::Filled(color) = grid.get(at(k)) else {
            k += 1;
            continue;
        };
        let mut run = 1;
        while k + run < WIDTH && grid.get(at(k + run)) == Cell::Filled(color) {
            run += 1;
        }
        if run >= MIN_RUN {
            out.extend((k..k + run).map(&at));
        }
        k += run;
    }
}
