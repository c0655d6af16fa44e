//! Grid: the locked pile. `x` is the column (left to right), `y` the row (top to bottom).
//!
//! Storage holds `width` columns and `height + 1` rows. The extra row at index `height` is
//! the floor row: blocks are allowed to come to rest in it, so it takes part in locking and
//! line clearing like any other row.

use crate::error::EngineError;
use crate::palette::Tones;
use crate::shape::{Mask, Shape};

/// Grid size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Cells that fit on a drawing surface of `px_width` x `px_height` pixels.
    pub fn from_surface(px_width: u32, px_height: u32, cell_size: u16) -> Result<Self, EngineError> {
        if cell_size == 0 {
            return Err(EngineError::InvalidCellSize);
        }
        let cell = u32::from(cell_size);
        Ok(Self {
            width: (px_width / cell) as usize,
            height: (px_height / cell) as usize,
        })
    }
}

/// One grid cell. `colors` is `Some` exactly when the cell is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub occupied: bool,
    pub colors: Option<Tones>,
}

impl Cell {
    pub const EMPTY: Self = Self {
        occupied: false,
        colors: None,
    };

    pub const fn filled(colors: Tones) -> Self {
        Self {
            occupied: true,
            colors: Some(colors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dims: Dimensions,
    /// Flat storage, row-major (`y * width + x`), `height + 1` rows.
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            cells: vec![Cell::EMPTY; dims.width * (dims.height + 1)],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    /// Number of stored rows, floor row included.
    pub fn rows(&self) -> usize {
        self.dims.height + 1
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.dims.width || y > self.dims.height {
            return None;
        }
        Some(y * self.dims.width + x)
    }

    /// Cell at `(x, y)`, or `None` outside storage. Never grows storage.
    #[inline]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    /// Out-of-range reads report "not occupied".
    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.cell_at(x, y).is_some_and(|c| c.occupied)
    }

    /// Set cell at `(x, y)`. Returns false if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Commit a shape with its own colours at frame offset `(x, y)`.
    pub fn lock(&mut self, shape: &Shape, x: i32, y: i32) -> usize {
        self.lock_mask(&shape.mask, x, y, shape.tones)
    }

    /// Mark every occupied mask cell as occupied with `tones`. Cells outside storage (a block
    /// that is still partly above the grid) are dropped. Returns the number of cells written.
    pub fn lock_mask(&mut self, mask: &Mask, x: i32, y: i32, tones: Tones) -> usize {
        let mut written = 0;
        mask.for_each_occupied(|col, row| {
            if self.set(x + col as i32, y + row as i32, Cell::filled(tones)) {
                written += 1;
            }
        });
        written
    }

    /// Visit occupied cells in row-major order.
    pub fn for_each_occupied(&self, mut f: impl FnMut(usize, usize, &Tones)) {
        let width = self.dims.width;
        if width == 0 {
            return;
        }
        for (idx, cell) in self.cells.iter().enumerate() {
            if let (true, Some(colors)) = (cell.occupied, cell.colors.as_ref()) {
                f(idx % width, idx / width, colors);
            }
        }
    }

    /// Occupied cells in row `y`; zero for rows outside storage.
    pub fn row_count(&self, y: usize) -> usize {
        if y > self.dims.height {
            return 0;
        }
        let start = y * self.dims.width;
        self.cells[start..start + self.dims.width]
            .iter()
            .filter(|c| c.occupied)
            .count()
    }

    /// Drop row `y` by shifting every row above it down one, then empty row 0.
    pub fn shift_down_into(&mut self, y: usize) {
        if y > self.dims.height {
            return;
        }
        let width = self.dims.width;
        for row in (1..=y).rev() {
            let src_start = (row - 1) * width;
            self.cells.copy_within(src_start..src_start + width, row * width);
        }
        for cell in &mut self.cells[..width] {
            *cell = Cell::EMPTY;
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupied).count()
    }
}
