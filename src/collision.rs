//! Placement legality.

use crate::grid::Grid;
use crate::shape::Mask;

/// True if `mask` framed at `(x, y)` fits: every occupied cell lies in a column of
/// `[0, width)`, in a row no lower than the floor row, and on an empty grid cell. Rows above
/// the grid are always passable so blocks can descend into view. Never mutates the grid.
pub fn can_place(grid: &Grid, mask: &Mask, x: i32, y: i32) -> bool {
    let width = grid.width() as i32;
    let floor = grid.height() as i32;
    mask.occupied().all(|(col, row)| {
        let gx = x + col as i32;
        let gy = y + row as i32;
        if gx < 0 || gx >= width || gy > floor {
            return false;
        }
        gy < 0 || !grid.is_occupied(gx, gy)
    })
}
