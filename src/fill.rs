//! Random settled pile, used to start a board that already looks played.

use crate::grid::{Cell, Grid};
use crate::shape::Catalog;
use rand::Rng;

/// Chance that a lower-half cell starts occupied.
pub const FILL_PROBABILITY: f64 = 0.85;

/// Scatter catalog colours over the lower half, then settle every column.
pub fn randomly_fill(grid: &mut Grid, catalog: &Catalog, rng: &mut impl Rng) {
    scatter(grid, catalog, rng);
    settle_columns(grid);
    log::debug!("randomly filled {} cells", grid.occupied_count());
}

/// Occupy each cell strictly below the middle row with probability [`FILL_PROBABILITY`].
fn scatter(grid: &mut Grid, catalog: &Catalog, rng: &mut impl Rng) {
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let shapes = catalog.shapes();

    for x in 0..width {
        for y in 0..=height {
            if 2 * y > height && rng.random::<f64>() > 1.0 - FILL_PROBABILITY {
                let tones = shapes[rng.random_range(0..shapes.len())].tones;
                grid.set(x, y, Cell::filled(tones));
            }
        }
    }
}

/// Scanning each column upwards from just above the floor row, an empty cell pulls the part
/// of the column above it down by one row. The floor row itself is never a gap.
fn settle_columns(grid: &mut Grid) {
    let width = grid.width() as i32;
    let height = grid.height() as i32;

    for x in 0..width {
        for y in (1..height).rev() {
            if grid.is_occupied(x, y) {
                continue;
            }
            for yy in (1..=y).rev() {
                if let Some(&above) = grid.cell_at(x, yy - 1).filter(|c| c.occupied) {
                    grid.set(x, yy, above);
                    grid.set(x, yy - 1, Cell::EMPTY);
                }
            }
        }
    }
}
