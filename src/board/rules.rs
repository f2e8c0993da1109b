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

use anyhow::Result;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::cell::{Cell, Offset};
use super::material::PieceKind;

use PieceKind::*;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("line {line}: expected `row_offset,col_offset`, got `{text}`")]
    BadOffset { line: usize, text: String },
}

/// The candidate destinations of a piece type: a fixed list of relative
/// offsets, clipped to the board.
///
/// This does not know about blocking pieces or the pawn's special cases;
/// those are applied on top by command validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRules {
    offsets: Vec<Offset>,
    height: i32,
    width: i32,
}

impl MoveRules {
    pub fn new(offsets: Vec<Offset>, height: i32, width: i32) -> Self {
        Self {
            offsets,
            height,
            width,
        }
    }

    /// Parses a `moves.txt` table. One `row_offset,col_offset` pair per
    /// line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str, height: i32, width: i32) -> Result<Self> {
        let mut offsets = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let bad = || RulesError::BadOffset {
                line: index + 1,
                text: raw.to_string(),
            };
            let (rows, cols) = line.split_once(',').ok_or_else(bad)?;
            let rows: i32 = rows.trim().parse().map_err(|_| bad())?;
            let cols: i32 = cols.trim().parse().map_err(|_| bad())?;
            offsets.push(Offset::new(rows, cols));
        }
        Ok(Self::new(offsets, height, width))
    }

    /// Classic chess movement for `kind` on a board of the given size.
    pub fn standard(kind: PieceKind, height: i32, width: i32) -> Self {
        let offsets = if height == 8 && width == 8 {
            STANDARD_OFFSETS[&kind].clone()
        } else {
            standard_offsets(kind, height.max(width) - 1)
        };
        Self::new(offsets, height, width)
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub fn get_moves(&self, from: Cell) -> Vec<Cell> {
        self.offsets
            .iter()
            .map(|offset| from + offset)
            .filter(|cell| {
                (0..self.height).contains(&cell.row) && (0..self.width).contains(&cell.col)
            })
            .collect()
    }

    pub fn allows(&self, from: Cell, to: Cell) -> bool {
        self.get_moves(from).contains(&to)
    }
}

const KING_OFFSETS: [Offset; 8] = [
    Offset::new(-1, -1),
    Offset::new(-1, 0),
    Offset::new(-1, 1),
    Offset::new(0, -1),
    Offset::new(0, 1),
    Offset::new(1, -1),
    Offset::new(1, 0),
    Offset::new(1, 1),
];

const KNIGHT_OFFSETS: [Offset; 8] = [
    Offset::new(-2, -1),
    Offset::new(-2, 1),
    Offset::new(2, -1),
    Offset::new(2, 1),
    Offset::new(-1, -2),
    Offset::new(-1, 2),
    Offset::new(1, -2),
    Offset::new(1, 2),
];

// Pawns are validated by their own geometry; the table only lists the
// cells a pawn could ever reach so that `get_moves` is still meaningful.
const PAWN_OFFSETS: [Offset; 8] = [
    Offset::new(-1, 0),
    Offset::new(-2, 0),
    Offset::new(-1, -1),
    Offset::new(-1, 1),
    Offset::new(1, 0),
    Offset::new(2, 0),
    Offset::new(1, -1),
    Offset::new(1, 1),
];

fn slides(directions: &[Offset], reach: i32) -> Vec<Offset> {
    directions
        .iter()
        .flat_map(|dir| (1..=reach).map(move |k| Offset::new(dir.rows * k, dir.cols * k)))
        .collect()
}

fn standard_offsets(kind: PieceKind, reach: i32) -> Vec<Offset> {
    let horizontals: Vec<Offset> = KING_OFFSETS
        .into_iter()
        .filter(|o| o.rows == 0 || o.cols == 0)
        .collect();
    let diagonals: Vec<Offset> = KING_OFFSETS
        .into_iter()
        .filter(|o| o.rows != 0 && o.cols != 0)
        .collect();
    match kind {
        King => KING_OFFSETS.to_vec(),
        Queen => slides(&KING_OFFSETS, reach),
        Rook => slides(&horizontals, reach),
        Bishop => slides(&diagonals, reach),
        Knight => KNIGHT_OFFSETS.to_vec(),
        Pawn => PAWN_OFFSETS.to_vec(),
    }
}

static STANDARD_OFFSETS: Lazy<HashMap<PieceKind, Vec<Offset>>> = Lazy::new(|| {
    PieceKind::iter()
        .map(|kind| (kind, standard_offsets(kind, 7)))
        .collect()
});
