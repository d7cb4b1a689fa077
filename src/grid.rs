//! Board model: a fixed 6x6 row-major array of candy cells.
//!
//! Row 0 is the top of the board; gravity pulls toward the highest row.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{CELL_COUNT, WIDTH};

// --- Colors -----------------------------------------------------------------

/// The seven candy colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    Red,
    Yellow,
    Cyan,
    Orange,
    Green,
    Purple,
    Pink,
}

impl Color {
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Yellow,
        Color::Cyan,
        Color::Orange,
        Color::Green,
        Color::Purple,
        Color::Pink,
    ];

    /// CSS background used by the DOM renderer.
    pub fn css(self) -> &'static str {
        match self {
            Color::Red => "#FF2D55",
            Color::Yellow => "#FFCC00",
            Color::Cyan => "#00E5FF",
            Color::Orange => "#FF7A00",
            Color::Green => "#7CFF6A",
            Color::Purple => "#C86CFF",
            Color::Pink => "#FF6B9A",
        }
    }
}

/// One board slot. `Empty` only exists between a clear and the following refill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Filled(c) => Some(c),
            Cell::Empty => None,
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Color> for Cell {
    fn from(c: Color) -> Self {
        Cell::Filled(c)
    }
}

// --- Random palette draws -----------------------------------------------------

/// Supplies fresh colors for initial fills and refills.
pub trait ColorSource {
    fn next_color(&mut self) -> Color;
}

/// Uniform draw from [`Color::ALL`] backed by a `rand` generator.
pub struct RandomColors<R = SmallRng> {
    rng: R,
}

impl RandomColors<SmallRng> {
    /// Seeded from OS / browser entropy.
    pub fn from_entropy() -> Self {
        Self { rng: SmallRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> RandomColors<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ColorSource for RandomColors<R> {
    fn next_color(&mut self) -> Color {
        Color::ALL[self.rng.gen_range(0..Color::ALL.len())]
    }
}

// --- Grid -------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: [Cell; CELL_COUNT],
}

impl Default for Grid {
    fn default() -> Self {
        Self { cells: [Cell::Empty; CELL_COUNT] }
    }
}

impl Grid {
    /// Every cell drawn independently. Pre-existing runs are left in place.
    pub fn random(source: &mut dyn ColorSource) -> Self {
        let mut grid = Self::default();
        grid.initialize(source);
        grid
    }

    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Convenience for fully populated boards (tests, fixtures).
    pub fn from_colors(colors: [Color; CELL_COUNT]) -> Self {
        Self { cells: colors.map(Cell::Filled) }
    }

    pub fn initialize(&mut self, source: &mut dyn ColorSource) {
        for cell in self.cells.iter_mut() {
            *cell = Cell::Filled(source.next_color());
        }
    }

    pub fn get(&self, idx: usize) -> Cell {
        self.cells[idx]
    }

    pub fn set(&mut self, idx: usize, cell: Cell) {
        self.cells[idx] = cell;
    }

    /// Exchange two cells. Adjacency is the gesture layer's concern.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.cells.swap(a, b);
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// True once every cell holds a color.
    pub fn is_settled(&self) -> bool {
        self.empty_count() == 0
    }

    pub fn index(row: usize, col: usize) -> usize {
        row * WIDTH + col
    }

    pub fn row_of(idx: usize) -> usize {
        idx / WIDTH
    }

    pub fn col_of(idx: usize) -> usize {
        idx % WIDTH
    }
}
