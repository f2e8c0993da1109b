// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Board geometry for real-time chess
//!
//! Nothing in this module holds game state. It provides the pure
//! coordinate math the simulation builds upon:
//!
//! * A `Cell` is an integer `(row, col)` pair. Row 0 is the top of the
//!   board, so white pawns advance towards decreasing rows. An `Offset`
//!   is the difference between two cells; `Offset::to_unit` turns a
//!   straight or diagonal offset into a single step.
//!
//! * A `WorldPos` is a continuous position in board pixels. Pieces in
//!   flight are somewhere between cells; a piece only takes part in
//!   collision detection when its position lands exactly on a cell
//!   boundary (see `Board::is_valid_cell`).
//!
//! * `Material` is a piece kind of a given side (`PW`, `KB`, ...).
//!   `Side` is either `White` or `Black`.
//!
//! * `MoveRules` is the per piece type list of relative offsets that
//!   yields candidate destinations.
//!
//! * `Board` converts between cells, pixels and algebraic notation
//!   (`a1` .. `h8` on a standard board).

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod cell;
mod material;
mod rules;

pub use cell::*;
pub use material::*;
pub use rules::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("`{0}` is not a cell in algebraic notation")]
    Malformed(String),
    #[error("{0} is off the board")]
    OffBoard(Cell),
}

/// Dimensions of the board, in cells and in pixels.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    width_cells: i32,
    height_cells: i32,
    cell_w_px: i32,
    cell_h_px: i32,
    cell_w_m: i32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(8, 8, 100, 100)
    }
}

impl Board {
    pub const fn new(width_cells: i32, height_cells: i32, cell_w_px: i32, cell_h_px: i32) -> Self {
        Self {
            width_cells,
            height_cells,
            cell_w_px,
            cell_h_px,
            cell_w_m: 1,
        }
    }

    pub const fn with_cell_meters(mut self, cell_w_m: i32) -> Self {
        self.cell_w_m = cell_w_m;
        self
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width_cells
    }
    #[inline]
    pub fn height(&self) -> i32 {
        self.height_cells
    }
    #[inline]
    pub fn cell_w_px(&self) -> i32 {
        self.cell_w_px
    }
    #[inline]
    pub fn cell_h_px(&self) -> i32 {
        self.cell_h_px
    }

    /// Conversion factor from configured speeds (m/s) to pixels.
    pub fn pixels_per_meter(&self) -> f64 {
        f64::from(self.cell_w_px) / f64::from(self.cell_w_m.max(1))
    }

    /// True when every dimension is positive.
    pub fn is_well_formed(&self) -> bool {
        self.width_cells > 0
            && self.height_cells > 0
            && self.cell_w_px > 0
            && self.cell_h_px > 0
            && self.cell_w_m > 0
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.height_cells).contains(&cell.row) && (0..self.width_cells).contains(&cell.col)
    }

    /// True for the first and last rows, where pawns promote.
    #[inline]
    pub fn is_edge_rank(&self, cell: Cell) -> bool {
        cell.row == 0 || cell.row == self.height_cells - 1
    }

    /// Starting row of the pawns of `side`.
    pub fn pawn_rank(&self, side: Side) -> i32 {
        match side {
            Side::White => self.height_cells - 2,
            Side::Black => 1,
        }
    }

    pub fn cell_to_world(&self, cell: Cell) -> WorldPos {
        WorldPos::new(
            f64::from(cell.col * self.cell_w_px),
            f64::from(cell.row * self.cell_h_px),
        )
    }

    pub fn world_to_cell(&self, pos: WorldPos) -> Cell {
        let col = (pos.x / f64::from(self.cell_w_px)).floor() as i32;
        let row = (pos.y / f64::from(self.cell_h_px)).floor() as i32;
        Cell::new(row, col)
    }

    /// True iff the pixel coordinates sit exactly on a cell corner.
    pub fn is_valid_cell(&self, x: i64, y: i64) -> bool {
        x % i64::from(self.cell_w_px) == 0 && y % i64::from(self.cell_h_px) == 0
    }

    /// The cell a continuous position occupies for collision purposes,
    /// or `None` while it is between cells.
    pub fn aligned_cell(&self, pos: WorldPos) -> Option<Cell> {
        let (x, y) = (pos.x as i64, pos.y as i64);
        if !self.is_valid_cell(x, y) {
            return None;
        }
        let cell = Cell::new(
            (y / i64::from(self.cell_h_px)) as i32,
            (x / i64::from(self.cell_w_px)) as i32,
        );
        Some(cell)
    }

    /// Parses `e2` style notation. The column letter maps to a 0-based
    /// index and the row number `n` to `height - n`.
    pub fn algebraic_to_cell(&self, notation: &str) -> Result<Cell, NotationError> {
        let malformed = || NotationError::Malformed(notation.to_string());
        let notation = notation.trim();
        let mut chars = notation.chars();
        let letter = chars.next().ok_or_else(malformed)?.to_ascii_lowercase();
        if !letter.is_ascii_lowercase() {
            return Err(malformed());
        }
        let rank: i32 = chars.as_str().parse().map_err(|_| malformed())?;
        if rank < 1 {
            return Err(malformed());
        }
        let cell = Cell::new(self.height_cells - rank, (letter as u8 - b'a') as i32);
        if !self.contains(cell) {
            return Err(NotationError::OffBoard(cell));
        }
        Ok(cell)
    }

    pub fn cell_to_algebraic(&self, cell: Cell) -> String {
        let letter = (b'a' + cell.col as u8) as char;
        format!("{}{}", letter, self.height_cells - cell.row)
    }
}
