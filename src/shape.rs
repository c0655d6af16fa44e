//! Block shapes: the 4x4 occupancy mask, shapes paired with colours, and the ordered catalog.

use crate::error::EngineError;
use crate::palette::{Palette, Tones};

/// Side length of every mask frame.
pub const MASK_SIZE: usize = 4;

/// A 4x4 occupancy mask. `cells[row][col]`; row 0 is the top of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask {
    cells: [[bool; MASK_SIZE]; MASK_SIZE],
}

impl Mask {
    pub const EMPTY: Self = Self {
        cells: [[false; MASK_SIZE]; MASK_SIZE],
    };

    /// Build a mask from four rows of text, `#` marking an occupied cell.
    pub fn from_rows(rows: [&str; MASK_SIZE]) -> Self {
        let mut cells = [[false; MASK_SIZE]; MASK_SIZE];
        for (row, text) in rows.iter().enumerate() {
            for (col, ch) in text.chars().take(MASK_SIZE).enumerate() {
                cells[row][col] = ch == '#';
            }
        }
        Self { cells }
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> bool {
        row < MASK_SIZE && col < MASK_SIZE && self.cells[row][col]
    }

    pub fn count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c).count()
    }

    /// Quarter turn: the cell at column `x`, row `y` takes the value of column `3 - y`, row `x`.
    pub fn rotated(&self) -> Self {
        let mut out = Self::EMPTY;
        for y in 0..MASK_SIZE {
            for x in 0..MASK_SIZE {
                out.cells[y][x] = self.cells[x][MASK_SIZE - 1 - y];
            }
        }
        out
    }

    /// Visit occupied cells in row-major order with frame-local `(col, row)`.
    pub fn for_each_occupied(&self, mut f: impl FnMut(usize, usize)) {
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, &occupied) in cells.iter().enumerate() {
                if occupied {
                    f(col, row);
                }
            }
        }
    }

    /// Occupied cells as frame-local `(col, row)` pairs.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..MASK_SIZE)
            .flat_map(|row| (0..MASK_SIZE).map(move |col| (col, row)))
            .filter(|&(col, row)| self.cells[row][col])
    }
}

/// A mask paired with the colour triple it is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub mask: Mask,
    pub tones: Tones,
}

impl Shape {
    pub const fn new(mask: Mask, tones: Tones) -> Self {
        Self { mask, tones }
    }
}

/// Ordered, non-empty set of shapes that spawning draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    shapes: Vec<Shape>,
}

impl Catalog {
    /// Caller-supplied shape set; order is preserved.
    pub fn custom(shapes: Vec<Shape>) -> Result<Self, EngineError> {
        if shapes.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        Ok(Self { shapes })
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// The seven canonical families in catalog order: square, straight, Z, T, S, J, L.
pub fn create_catalog(palette: &Palette) -> Catalog {
    let square = Mask::from_rows(["....", ".##.", ".##.", "...."]);
    let straight = Mask::from_rows(["..#.", "..#.", "..#.", "..#."]);
    let z = Mask::from_rows(["....", ".#..", ".##.", "..#."]);
    let t = Mask::from_rows(["....", ".#..", ".##.", ".#.."]);
    let s = Mask::from_rows(["..#.", ".##.", ".#..", "...."]);
    let j = Mask::from_rows(["....", "..#.", "###.", "...."]);
    let l = Mask::from_rows(["....", "###.", "..#.", "...."]);

    Catalog {
        shapes: vec![
            Shape::new(square, palette.square),
            Shape::new(straight, palette.straight),
            Shape::new(z, palette.z),
            Shape::new(t, palette.t),
            Shape::new(s, palette.s),
            Shape::new(j, palette.j),
            Shape::new(l, palette.l),
        ],
    }
}
