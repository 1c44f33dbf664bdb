use crate::collage::Columns;

/// Largest canvas composed, in pixels (800 MB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 200_000_000;

/// Grid shape for `count` tiles of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

/// Top-left corner of one tile on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

impl GridLayout {
    /// `count` must be at least 1.
    pub fn new(count: usize, columns: Columns, tile_width: u32, tile_height: u32) -> Self {
        let count = count.max(1) as u32;
        let columns = match columns {
            Columns::Auto => (f64::from(count)).sqrt().ceil() as u32,
            Columns::Fixed(n) => n,
        }
        .max(1);
        let rows = count.div_ceil(columns);

        Self {
            columns,
            rows,
            tile_width,
            tile_height,
        }
    }

    /// Canvas width and height, `None` when the canvas would exceed
    /// [`MAX_CANVAS_PIXELS`] or a side does not fit in `u32`.
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        let width = self.columns.checked_mul(self.tile_width)?;
        let height = self.rows.checked_mul(self.tile_height)?;
        (u64::from(width) * u64::from(height) <= MAX_CANVAS_PIXELS).then_some((width, height))
    }

    /// Left to right, top to bottom.
    pub fn placement(&self, index: usize) -> Placement {
        let index = index as u32;
        Placement {
            x: (index % self.columns) * self.tile_width,
            y: (index / self.columns) * self.tile_height,
        }
    }
}
