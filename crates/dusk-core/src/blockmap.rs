//! Uniform grid from map cells to the linedefs that touch them.
//!
//! Broad-phase only: a cell listing a line says nothing about whether a
//! given point actually touches it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::geometry::Aabb;
use crate::map::MapData;

/// Cell edge length in map units.
pub const BLOCK_SIZE: f32 = 128.0;

/// Largest grid [`Blockmap::build`] will allocate, 1024 cells on a side.
pub const MAX_BLOCKMAP_CELLS: usize = 1 << 20;

/// Cells needed to cover `extent` along one axis.
fn grid_span(extent: f32) -> Option<u32> {
    let cells = (extent / BLOCK_SIZE).floor();
    if !cells.is_finite() || cells < 0.0 || cells >= MAX_BLOCKMAP_CELLS as f32 {
        return None;
    }
    (cells as u32).checked_add(1)
}

/// Grid of linedef index lists, row-major from the origin corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockmap {
    /// World position of the grid's minimum corner.
    pub origin: Vec2,
    /// Number of cells along X.
    pub columns: u32,
    /// Number of cells along Y.
    pub rows: u32,
    /// Linedef indices per cell, `rows * columns` entries.
    pub cells: Vec<Vec<usize>>,
}

impl Blockmap {
    /// Rasterize every linedef's bounding box into the grid covering `map`.
    ///
    /// Conservative: a line lands in every cell its box overlaps. Fails when
    /// the map's extent would need more than [`MAX_BLOCKMAP_CELLS`] cells.
    pub fn build(map: &MapData) -> MapResult<Self> {
        let Some(bounds) = map.bounds() else {
            return Ok(Self {
                origin: Vec2::ZERO,
                columns: 0,
                rows: 0,
                cells: Vec::new(),
            });
        };
        let extent = bounds.max - bounds.min;
        let too_large = || MapError::BlockmapTooLarge {
            map: map.name.clone(),
            width: extent.x,
            height: extent.y,
        };
        let columns = grid_span(extent.x).ok_or_else(too_large)?;
        let rows = grid_span(extent.y).ok_or_else(too_large)?;
        let count = (columns as usize)
            .checked_mul(rows as usize)
            .filter(|&n| n <= MAX_BLOCKMAP_CELLS)
            .ok_or_else(too_large)?;
        let mut blockmap = Self {
            origin: bounds.min,
            columns,
            rows,
            cells: vec![Vec::new(); count],
        };

        for (index, _) in map.linedefs.iter().enumerate() {
            let Some((a, b)) = map.line_endpoints(index) else {
                continue;
            };
            let Some((x0, x1, y0, y1)) = blockmap.cell_range(Aabb::from_corners(a, b)) else {
                continue;
            };
            for row in y0..=y1 {
                for col in x0..=x1 {
                    let cell = row as usize * columns as usize + col as usize;
                    blockmap.cells[cell].push(index);
                }
            }
        }
        Ok(blockmap)
    }

    /// Number of cells declared by the header.
    pub fn cell_count(&self) -> usize {
        (self.columns as usize).saturating_mul(self.rows as usize)
    }

    /// Column/row span `(x0, x1, y0, y1)` overlapped by `area`, clipped to
    /// the grid. `None` when the box lies entirely outside.
    pub fn cell_range(&self, area: Aabb) -> Option<(u32, u32, u32, u32)> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }
        let lo = (area.min - self.origin) / BLOCK_SIZE;
        let hi = (area.max - self.origin) / BLOCK_SIZE;
        let max_col = (self.columns - 1) as f32;
        let max_row = (self.rows - 1) as f32;
        if hi.x < 0.0 || hi.y < 0.0 || lo.x.floor() > max_col || lo.y.floor() > max_row {
            return None;
        }
        let x0 = lo.x.floor().clamp(0.0, max_col) as u32;
        let x1 = hi.x.floor().clamp(0.0, max_col) as u32;
        let y0 = lo.y.floor().clamp(0.0, max_row) as u32;
        let y1 = hi.y.floor().clamp(0.0, max_row) as u32;
        Some((x0, x1, y0, y1))
    }

    /// Deduplicated candidate linedefs for `area`, in ascending index order.
    pub fn query(&self, area: Aabb) -> Vec<usize> {
        let Some((x0, x1, y0, y1)) = self.cell_range(area) else {
            return Vec::new();
        };
        let mut lines = Vec::new();
        for row in y0..=y1 {
            for col in x0..=x1 {
                if let Some(cell) = self.cells.get(row as usize * self.columns as usize + col as usize) {
                    lines.extend_from_slice(cell);
                }
            }
        }
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}
