//! Staggered hex-grid geometry
//!
//! Cells are packed like circles: each row is one diameter apart
//! horizontally, rows are `radius * sqrt(3)` apart vertically and every odd
//! row is indented by one radius. Row 0 hangs from the ceiling line.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The up-to-6 hex neighbours of this cell.
    ///
    /// Even rows reach diagonally to `col - 1`, odd rows to `col + 1`.
    /// Cells outside the grid are included; callers filter by occupancy.
    pub fn touching(self) -> [Cell; 6] {
        let Cell { row, col } = self;
        let diagonal = if row.rem_euclid(2) == 0 { col - 1 } else { col + 1 };
        [
            Cell::new(row, col - 1),
            Cell::new(row, col + 1),
            Cell::new(row - 1, col),
            Cell::new(row + 1, col),
            Cell::new(row - 1, diagonal),
            Cell::new(row + 1, diagonal),
        ]
    }
}

/// Cell centre positions for one board at one ceiling offset
#[derive(Debug, Clone)]
pub struct HexGrid {
    width: f32,
    height: f32,
    radius: f32,
    ceiling: f32,
    /// Cell centres, row-major
    rows: Vec<Vec<Vec2>>,
}

impl HexGrid {
    pub fn new(width: f32, height: f32, radius: f32, ceiling: f32) -> Self {
        let mut grid = Self {
            width,
            height,
            radius,
            ceiling,
            rows: Vec::new(),
        };
        grid.generate();
        grid
    }

    /// Vertical distance between row centres
    #[inline]
    pub fn row_spacing(&self) -> f32 {
        self.radius * 3.0_f32.sqrt()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Move row 0 to a new ceiling offset and rebuild all cell positions
    pub fn set_ceiling(&mut self, ceiling: f32) {
        self.ceiling = ceiling;
        self.generate();
    }

    fn generate(&mut self) {
        let r = self.radius;
        let spacing = self.row_spacing();

        self.rows.clear();
        let mut row = 0usize;
        loop {
            let y = r + self.ceiling + spacing * row as f32;
            if y > self.height - r {
                break;
            }
            let indent = if row % 2 == 0 { r } else { 2.0 * r };
            let cells: Vec<Vec2> = (0..)
                .map(|col| indent + 2.0 * r * col as f32)
                .take_while(|&x| x < self.width - r)
                .map(|x| Vec2::new(x, y))
                .collect();
            self.rows.push(cells);
            row += 1;
        }
    }

    /// Cell centres, row by row
    pub fn rows(&self) -> &[Vec<Vec2>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of cells in `row` (0 if the row does not exist)
    pub fn row_len(&self, row: i32) -> usize {
        usize::try_from(row)
            .ok()
            .and_then(|r| self.rows.get(r))
            .map_or(0, Vec::len)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the lowest row, where penalty pieces appear
    pub fn floor_row(&self) -> Option<i32> {
        self.rows.len().checked_sub(1).map(|r| r as i32)
    }

    /// Centre of `cell`, if it lies on the grid
    pub fn position(&self, cell: Cell) -> Option<Vec2> {
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        self.rows.get(row)?.get(col).copied()
    }

    /// Every cell with its centre, in scan order
    pub fn cells(&self) -> impl Iterator<Item = (Cell, Vec2)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, &pos)| (Cell::new(row as i32, col as i32), pos))
        })
    }

    /// Nearest cell to `pos` among those accepted by `accept`.
    ///
    /// Ties go to the first cell in scan order.
    pub fn nearest_cell_where(
        &self,
        pos: Vec2,
        mut accept: impl FnMut(Cell) -> bool,
    ) -> Option<(Cell, Vec2)> {
        let mut best: Option<(Cell, Vec2, f32)> = None;
        for (cell, centre) in self.cells() {
            if !accept(cell) {
                continue;
            }
            let dist = pos.distance_squared(centre);
            if best.is_none_or(|(_, _, d)| dist < d) {
                best = Some((cell, centre, dist));
            }
        }
        best.map(|(cell, centre, _)| (cell, centre))
    }

    /// Nearest cell to `pos`.
    ///
    /// Panics on an empty grid; settings validation keeps boards large
    /// enough to hold at least one row.
    pub fn nearest_cell(&self, pos: Vec2) -> (Cell, Vec2) {
        self.nearest_cell_where(pos, |_| true)
            .expect("nearest_cell called on an empty grid")
    }
}
