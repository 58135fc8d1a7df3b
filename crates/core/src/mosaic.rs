//! Mosaic wall grid geometry and tile placement.
//!
//! A mosaic wall is a `columns x rows` grid; each approved guest photo can
//! occupy one cell. Hosts may place a tile at an explicit cell, otherwise
//! cells are handed out in a deterministic spread order so that a wall that
//! is only partly filled still looks evenly covered on the live display.

use std::collections::HashSet;

use serde::Serialize;

/// Smallest and largest accepted grid dimension.
pub const MIN_DIMENSION: i32 = 1;
pub const MAX_DIMENSION: i32 = 200;

/// Accepted tile edge length range in pixels.
pub const MIN_TILE_SIZE_PX: i32 = 16;
pub const MAX_TILE_SIZE_PX: i32 = 1024;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE_PX: i32 = 128;

/// A cell coordinate on the wall, zero-based from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

/// Validate wall dimensions and tile size.
pub fn validate_dimensions(columns: i32, rows: i32, tile_size_px: i32) -> Result<(), String> {
    let mut errors = Vec::new();
    for (name, value) in [("columns", columns), ("rows", rows)] {
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
            errors.push(format!(
                "{name} must be between {MIN_DIMENSION} and {MAX_DIMENSION}, got {value}"
            ));
        }
    }
    if !(MIN_TILE_SIZE_PX..=MAX_TILE_SIZE_PX).contains(&tile_size_px) {
        errors.push(format!(
            "tile_size_px must be between {MIN_TILE_SIZE_PX} and {MAX_TILE_SIZE_PX}, got {tile_size_px}"
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Grid occupancy for one wall.
#[derive(Debug, Clone)]
pub struct MosaicGrid {
    columns: i32,
    rows: i32,
    occupied: HashSet<Cell>,
}

impl MosaicGrid {
    /// Build a grid from the cells already holding tiles. Cells outside the
    /// grid (left over from a previous, larger configuration) are ignored.
    pub fn new(columns: i32, rows: i32, occupied: impl IntoIterator<Item = Cell>) -> Self {
        let mut grid = Self {
            columns: columns.max(0),
            rows: rows.max(0),
            occupied: HashSet::new(),
        };
        for cell in occupied {
            if grid.in_bounds(cell) {
                grid.occupied.insert(cell);
            }
        }
        grid
    }

    pub fn capacity(&self) -> usize {
        (self.columns as usize) * (self.rows as usize)
    }

    pub fn filled(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_full(&self) -> bool {
        self.filled() >= self.capacity()
    }

    /// Fraction of cells holding a tile, in `[0.0, 1.0]`.
    pub fn fill_ratio(&self) -> f64 {
        match self.capacity() {
            0 => 0.0,
            cap => self.filled() as f64 / cap as f64,
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.columns).contains(&cell.x) && (0..self.rows).contains(&cell.y)
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.occupied.contains(&cell)
    }

    /// Whether the wall can shrink to the given size without dropping tiles.
    pub fn fits_within(&self, columns: i32, rows: i32) -> bool {
        self.occupied.iter().all(|c| c.x < columns && c.y < rows)
    }

    fn cell_at(&self, index: usize) -> Cell {
        let cols = self.columns as usize;
        Cell {
            x: (index % cols) as i32,
            y: (index / cols) as i32,
        }
    }

    /// Stride used for the spread order: close to `capacity / phi`, bumped
    /// until coprime with the capacity so the walk visits every cell once.
    fn stride(&self) -> usize {
        let n = self.capacity();
        if n <= 2 {
            return 1;
        }
        let mut stride = ((n as f64) * 0.618_034).round() as usize;
        stride = stride.clamp(1, n - 1);
        while gcd(stride, n) != 1 {
            stride += 1;
            if stride >= n {
                stride = 1;
            }
        }
        stride
    }

    /// Every cell of the wall in placement order, starting at the centre.
    pub fn placement_order(&self) -> Vec<Cell> {
        let n = self.capacity();
        if n == 0 {
            return Vec::new();
        }
        let centre = (self.rows as usize / 2) * self.columns as usize + self.columns as usize / 2;
        let stride = self.stride();
        (0..n)
            .map(|k| self.cell_at((centre + k * stride) % n))
            .collect()
    }

    /// The next free cell in placement order, or `None` when full.
    pub fn next_free(&self) -> Option<Cell> {
        self.placement_order()
            .into_iter()
            .find(|c| !self.occupied.contains(c))
    }

    /// Claim a specific cell. Fails when out of bounds or taken.
    pub fn place_at(&mut self, cell: Cell) -> Result<Cell, String> {
        if !self.in_bounds(cell) {
            return Err(format!(
                "Cell ({}, {}) is outside the {}x{} wall",
                cell.x, cell.y, self.columns, self.rows
            ));
        }
        if !self.occupied.insert(cell) {
            return Err(format!("Cell ({}, {}) is already taken", cell.x, cell.y));
        }
        Ok(cell)
    }

    /// Claim the next free cell in placement order.
    pub fn place_next(&mut self) -> Result<Cell, String> {
        let cell = self
            .next_free()
            .ok_or_else(|| "Mosaic wall is full".to_string())?;
        self.occupied.insert(cell);
        Ok(cell)
    }

    /// Claim up to `count` cells in placement order.
    pub fn place_many(&mut self, count: usize) -> Vec<Cell> {
        let free: Vec<Cell> = self
            .placement_order()
            .into_iter()
            .filter(|c| !self.occupied.contains(c))
            .take(count)
            .collect();
        self.occupied.extend(free.iter().copied());
        free
    }
}
