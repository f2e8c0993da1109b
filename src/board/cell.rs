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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Integer board coordinates. Row 0 is the top of the board (black's back
/// rank on a standard layout), column 0 is the `a` file.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub rows: i32,
    pub cols: i32,
}

impl Offset {
    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Single step along a straight or diagonal line, or `None` when the
    /// offset is zero or not a line (e.g. a knight's jump).
    pub fn to_unit(self) -> Option<Self> {
        let (rows, cols) = match (self.rows, self.cols) {
            (0, 0) => return None,
            (r, c) if r == 0 || c == 0 || r.abs() == c.abs() => (r.signum(), c.signum()),
            _ => return None,
        };
        Some(Self { rows, cols })
    }
}

impl Add<Offset> for Cell {
    type Output = Cell;
    fn add(self, rhs: Offset) -> Self::Output {
        Cell::new(self.row + rhs.rows, self.col + rhs.cols)
    }
}

impl Add<&Offset> for Cell {
    type Output = Cell;
    fn add(self, rhs: &Offset) -> Self::Output {
        self + *rhs
    }
}

impl Sub for Cell {
    type Output = Offset;
    fn sub(self, rhs: Self) -> Self::Output {
        Offset::new(self.row - rhs.row, self.col - rhs.col)
    }
}

/// Continuous position in board pixel space.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: WorldPos) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation towards `other`, `t` in `[0, 1]`.
    pub fn lerp(&self, other: WorldPos, t: f64) -> WorldPos {
        WorldPos::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }
}
