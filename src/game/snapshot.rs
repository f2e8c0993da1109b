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
use std::collections::BTreeMap;

use super::command::PieceId;
use super::piece::Piece;
use super::state::StateKind;
use crate::board::{Board, Cell, PieceKind, Side};

/// What a remote peer needs to draw a piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub side: Side,
    pub cell: Cell,
    pub state_kind: StateKind,
    pub state_started_at: Option<u64>,
}

impl PieceSnapshot {
    pub fn of(piece: &Piece, board: &Board) -> Self {
        Self {
            kind: piece.kind(),
            side: piece.side(),
            cell: board.world_to_cell(piece.position()),
            state_kind: piece.state_kind(),
            state_started_at: piece.start_time(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub pieces: BTreeMap<PieceId, PieceSnapshot>,
}

impl BoardSnapshot {
    pub fn new<'a, I>(pieces: I, board: &Board) -> Self
    where
        I: IntoIterator<Item = &'a Piece>,
    {
        let pieces = pieces
            .into_iter()
            .map(|piece| (piece.id(), PieceSnapshot::of(piece, board)))
            .collect();
        Self { pieces }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
