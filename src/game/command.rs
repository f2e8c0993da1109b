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
use std::str::FromStr;
use thiserror::Error;

use super::state::StateKind;
use crate::board::{Board, Cell, Material, MaterialError, NotationError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("malformed command: {0}")]
    Malformed(#[from] NotationError),
    #[error("no piece at {0}")]
    EmptySource(Cell),
    #[error("command names {named} but {found} stands on the source cell")]
    UnknownPiece { named: PieceId, found: PieceId },
    #[error("{0} is occupied by a friendly piece")]
    FriendlyOccupant(Cell),
    #[error("path is blocked at {0}")]
    PathBlocked(Cell),
    #[error("cannot go from {from} to {to}")]
    IllegalTransition { from: StateKind, to: StateKind },
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Cell, to: Cell },
    #[error("the match is over")]
    Terminated,
}

/// Identity of a piece instance: its material plus a per-material serial
/// number, written `PW_3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceId {
    material: Material,
    serial: u32,
}

impl PieceId {
    pub const fn new(material: Material, serial: u32) -> Self {
        Self { material, serial }
    }
    #[inline]
    pub fn material(&self) -> Material {
        self.material
    }
    #[inline]
    pub fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.material, self.serial)
    }
}

impl FromStr for PieceId {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || MaterialError::UnknownCode(s.to_string());
        let (code, serial) = s.split_once('_').ok_or_else(unknown)?;
        let material = code.parse()?;
        let serial = serial.parse().map_err(|_| unknown())?;
        Ok(Self::new(material, serial))
    }
}

impl TryFrom<String> for PieceId {
    type Error = MaterialError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PieceId> for String {
    fn from(value: PieceId) -> Self {
        value.to_string()
    }
}

/// A command parameter: either algebraic notation (`"e2"`) or a cell
/// (`[6, 4]` / `{"row": 6, "col": 4}`), depending on the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellRef {
    Algebraic(String),
    Cell(Cell),
}

impl CellRef {
    pub fn resolve(&self, board: &Board) -> Result<Cell, NotationError> {
        match self {
            CellRef::Algebraic(notation) => board.algebraic_to_cell(notation),
            CellRef::Cell(cell) if board.contains(*cell) => Ok(*cell),
            CellRef::Cell(cell) => Err(NotationError::OffBoard(*cell)),
        }
    }
}

impl From<&str> for CellRef {
    fn from(value: &str) -> Self {
        CellRef::Algebraic(value.to_string())
    }
}

impl From<Cell> for CellRef {
    fn from(value: Cell) -> Self {
        CellRef::Cell(value)
    }
}

/// The only unit of intent entering the engine. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    timestamp_ms: u64,
    piece_id: PieceId,
    kind: StateKind,
    params: [CellRef; 2],
}

impl Command {
    pub fn new(
        timestamp_ms: u64,
        piece_id: PieceId,
        kind: StateKind,
        source: impl Into<CellRef>,
        destination: impl Into<CellRef>,
    ) -> Self {
        Self {
            timestamp_ms,
            piece_id,
            kind,
            params: [source.into(), destination.into()],
        }
    }

    #[inline]
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
    #[inline]
    pub fn piece_id(&self) -> PieceId {
        self.piece_id
    }
    #[inline]
    pub fn kind(&self) -> StateKind {
        self.kind
    }
    #[inline]
    pub fn source(&self) -> &CellRef {
        &self.params[0]
    }
    #[inline]
    pub fn destination(&self) -> &CellRef {
        &self.params[1]
    }

    pub fn cells(&self, board: &Board) -> Result<(Cell, Cell), CommandError> {
        Ok((
            self.source().resolve(board)?,
            self.destination().resolve(board)?,
        ))
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
