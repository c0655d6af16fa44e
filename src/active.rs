//! The falling block: spawning and rotation checks.

use crate::collision::can_place;
use crate::grid::Grid;
use crate::shape::{Catalog, MASK_SIZE, Mask, Shape};
use rand::Rng;

/// Row at which new blocks enter: the whole 4x4 frame sits above the grid.
pub const SPAWN_Y: i32 = -(MASK_SIZE as i32);

/// Current block with the top-left of its 4x4 frame at `(x, y)`; `y` is negative while the
/// block is still entering from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveBlock {
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl ActiveBlock {
    pub fn can_move(&self, grid: &Grid, dx: i32, dy: i32) -> bool {
        can_place(grid, &self.shape.mask, self.x + dx, self.y + dy)
    }

    /// Absolute grid coordinates of the occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .mask
            .occupied()
            .map(|(col, row)| (self.x + col as i32, self.y + row as i32))
    }
}

/// Pick a shape uniformly, place it at a random column where the frame fits, above the grid.
pub fn spawn(catalog: &Catalog, rng: &mut impl Rng, board_width: usize) -> ActiveBlock {
    let index = rng.random_range(0..catalog.len());
    let shape = catalog.shapes()[index];
    let max_x = board_width.saturating_sub(MASK_SIZE);
    let x = rng.random_range(0..=max_x) as i32;
    log::trace!("spawn shape #{index} at x={x}");
    ActiveBlock {
        shape,
        x,
        y: SPAWN_Y,
    }
}

/// Quarter-turned mask if it fits where the block is, otherwise the block's current mask.
/// No kicks are tried and nothing is committed.
pub fn rotate(block: &ActiveBlock, grid: &Grid) -> Mask {
    let rotated = block.shape.mask.rotated();
    if can_place(grid, &rotated, block.x, block.y) {
        rotated
    } else {
        block.shape.mask
    }
}
