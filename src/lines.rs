//! Line clearing and the level counter.

use crate::grid::Grid;

/// Lines per level step.
pub const LINES_PER_LEVEL: u32 = 20;

/// Counters after a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// Running total, including lines cleared before this pass.
    pub lines_cleared: u32,
    pub level: u32,
    /// Rows cleared by this pass alone.
    pub cleared: u32,
}

/// `lines` rounded to the nearest multiple of [`LINES_PER_LEVEL`], halves rounding up.
pub fn level_for(lines: u32) -> u32 {
    (lines + LINES_PER_LEVEL / 2) / LINES_PER_LEVEL * LINES_PER_LEVEL
}

/// Clear every complete row, scanning from the floor row upwards. The pile above a cleared
/// row drops by one and the same row index is checked again before the scan moves up.
pub fn resolve(grid: &mut Grid, lines_so_far: u32) -> Resolution {
    let mut out = Resolution {
        lines_cleared: lines_so_far,
        level: level_for(lines_so_far),
        cleared: 0,
    };
    let width = grid.width();
    if width == 0 {
        return out;
    }

    let mut y = grid.height();
    loop {
        if grid.row_count(y) == width {
            out.lines_cleared += 1;
            out.cleared += 1;
            out.level = level_for(out.lines_cleared);
            grid.shift_down_into(y);
            continue;
        }
        if y == 0 {
            break;
        }
        y -= 1;
    }

    if out.cleared > 0 {
        log::debug!(
            "cleared {} line(s), total {} (level {})",
            out.cleared,
            out.lines_cleared,
            out.level
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, Dimensions};
    use crate::palette::{Palette, Tones};

    fn fill_row(grid: &mut Grid, y: i32, tones: Tones) {
        for x in 0..grid.width() as i32 {
            grid.set(x, y, Cell::filled(tones));
        }
    }

    #[test]
    fn level_rounds_to_twenty() {
        assert_eq!(level_for(0), 0);
        assert_eq!(level_for(9), 0);
        assert_eq!(level_for(10), 20);
        assert_eq!(level_for(29), 20);
        assert_eq!(level_for(30), 40);
    }

    #[test]
    fn empty_grid_is_a_no_op() {
        let mut grid = Grid::new(Dimensions::new(10, 20));
        let res = resolve(&mut grid, 5);
        assert_eq!(res, Resolution { lines_cleared: 5, level: 0, cleared: 0 });
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn single_full_row_clears_every_index() {
        let palette = Palette::default();
        for r in 0..=8 {
            let mut grid = Grid::new(Dimensions::new(6, 8));
            fill_row(&mut grid, r, palette.square);
            let res = resolve(&mut grid, 0);
            assert_eq!(res.cleared, 1, "row {r}");
            assert_eq!(res.lines_cleared, 1);
            assert_eq!(grid.occupied_count(), 0);
        }
    }

    #[test]
    fn rows_above_shift_down_by_one() {
        let palette = Palette::default();
        let mut grid = Grid::new(Dimensions::new(5, 10));
        fill_row(&mut grid, 7, palette.square);
        grid.set(1, 6, Cell::filled(palette.t));
        grid.set(3, 2, Cell::filled(palette.l));
        grid.set(0, 9, Cell::filled(palette.z));

        let res = resolve(&mut grid, 0);
        assert_eq!(res.lines_cleared, 1);
        assert_eq!(grid.cell_at(1, 7), Some(&Cell::filled(palette.t)));
        assert_eq!(grid.cell_at(3, 3), Some(&Cell::filled(palette.l)));
        // Below the cleared row nothing moves.
        assert_eq!(grid.cell_at(0, 9), Some(&Cell::filled(palette.z)));
        assert!(!grid.is_occupied(1, 6));
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn adjacent_full_rows_rescan_same_index() {
        let palette = Palette::default();
        let mut grid = Grid::new(Dimensions::new(4, 6));
        fill_row(&mut grid, 5, palette.s);
        fill_row(&mut grid, 6, palette.j);
        grid.set(2, 4, Cell::filled(palette.t));

        let res = resolve(&mut grid, 19);
        assert_eq!(res.cleared, 2);
        assert_eq!(res.lines_cleared, 21);
        assert_eq!(res.level, 20);
        assert_eq!(grid.occupied_count(), 1);
        assert!(grid.is_occupied(2, 6));
    }

    #[test]
    fn separated_full_rows_both_clear() {
        let palette = Palette::default();
        let mut grid = Grid::new(Dimensions::new(4, 6));
        fill_row(&mut grid, 2, palette.s);
        fill_row(&mut grid, 5, palette.j);
        grid.set(0, 4, Cell::filled(palette.t));
        grid.set(1, 1, Cell::filled(palette.l));

        let res = resolve(&mut grid, 0);
        assert_eq!(res.cleared, 2);
        assert!(grid.is_occupied(0, 5));
        assert!(grid.is_occupied(1, 3));
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn partial_rows_stay() {
        let palette = Palette::default();
        let mut grid = Grid::new(Dimensions::new(4, 4));
        for x in 0..3 {
            grid.set(x, 4, Cell::filled(palette.z));
        }
        assert_eq!(resolve(&mut grid, 0).cleared, 0);
        assert_eq!(grid.row_count(4), 3);
    }
}
