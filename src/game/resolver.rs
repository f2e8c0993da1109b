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

use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use super::command::PieceId;
use super::factory::PieceFactory;
use super::piece::Piece;
use crate::board::Cell;

/// Which piece stands on which cell, rebuilt from scratch on every pass.
/// Pieces between cells, and jumping pieces that collide, are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    cells: HashMap<Cell, PieceId>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<PieceId> {
        self.cells.get(&cell).copied()
    }
    #[inline]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.cells.contains_key(&cell)
    }
    pub fn cell_of(&self, id: PieceId) -> Option<Cell> {
        self.cells
            .iter()
            .find_map(|(cell, occupant)| (*occupant == id).then_some(*cell))
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Cell, PieceId)> + '_ {
        self.cells.iter().map(|(cell, id)| (*cell, *id))
    }
    fn insert(&mut self, cell: Cell, id: PieceId) {
        self.cells.insert(cell, id);
    }
    fn clear(&mut self) {
        self.cells.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub capturing: PieceId,
    pub captured: PieceId,
    pub cell: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub old_id: PieceId,
    pub new_id: PieceId,
    pub cell: Cell,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub captures: Vec<Capture>,
    pub promotions: Vec<Promotion>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty() && self.promotions.is_empty()
    }
}

/// Decides a collision between the piece already placed on a cell and
/// the one arriving there. Returns true when `incoming` captures.
///
/// A moving piece always beats a stationary one. Between two moving
/// pieces the one whose state started first wins; on equal start times
/// the occupant keeps the cell. Between two stationary pieces the
/// incoming one wins unless only the occupant is allowed to capture.
pub fn should_capture(occupant: &Piece, incoming: &Piece) -> bool {
    match (occupant.is_stationary(), incoming.is_stationary()) {
        (true, false) => true,
        (false, true) => false,
        (false, false) => started(occupant) > started(incoming),
        (true, true) => incoming.can_capture() || !occupant.can_capture(),
    }
}

// A state that has not been updated yet counts as the most recent one.
fn started(piece: &Piece) -> u64 {
    piece.start_time().unwrap_or(u64::MAX)
}

/// Rebuilds `occupancy` from the pieces' positions, settles collisions,
/// promotes pawns on the first and last ranks and removes the captured
/// pieces from `pieces`.
///
/// Running it twice without advancing physics in between leaves the
/// occupancy unchanged and reports nothing the second time.
pub fn resolve(
    pieces: &mut Vec<Piece>,
    occupancy: &mut OccupancyMap,
    factory: &mut PieceFactory,
) -> Resolution {
    let board = *factory.board();
    let index: HashMap<PieceId, usize> = pieces
        .iter()
        .enumerate()
        .map(|(i, piece)| (piece.id(), i))
        .collect();
    let mut resolution = Resolution::default();
    let mut captured: HashSet<PieceId> = HashSet::new();

    occupancy.clear();
    for piece in pieces.iter() {
        let Some(cell) = board.aligned_cell(piece.position()) else {
            continue;
        };
        if !board.contains(cell) {
            continue;
        }
        let Some(occupant) = occupancy.get(cell).map(|id| &pieces[index[&id]]) else {
            occupancy.insert(cell, piece.id());
            continue;
        };
        // jumping pieces pass through without interacting
        if !piece.can_be_captured() {
            continue;
        }
        if !occupant.can_be_captured() {
            occupancy.insert(cell, piece.id());
            continue;
        }
        let (winner, loser) = if should_capture(occupant, piece) {
            (piece, occupant)
        } else {
            (occupant, piece)
        };
        info!(capturing = %winner.id(), captured = %loser.id(), %cell, "capture");
        resolution.captures.push(Capture {
            capturing: winner.id(),
            captured: loser.id(),
            cell,
        });
        captured.insert(loser.id());
        occupancy.insert(cell, winner.id());
    }

    // promotions see the occupancy left by every capture
    let promotable: Vec<(usize, Cell)> = pieces
        .iter()
        .enumerate()
        .filter(|(_, piece)| piece.kind().is_pawn() && !captured.contains(&piece.id()))
        .filter_map(|(i, piece)| {
            let cell = board.aligned_cell(piece.position())?;
            let placed = occupancy.get(cell) == Some(piece.id());
            (placed && board.is_edge_rank(cell)).then_some((i, cell))
        })
        .collect();
    for (i, cell) in promotable {
        match factory.promote(&pieces[i], cell) {
            Ok(queen) => {
                let old_id = pieces[i].id();
                info!(pawn = %old_id, queen = %queen.id(), %cell, "promotion");
                resolution.promotions.push(Promotion {
                    old_id,
                    new_id: queen.id(),
                    cell,
                });
                occupancy.insert(cell, queen.id());
                pieces[i] = queen;
            }
            Err(err) => warn!(pawn = %pieces[i].id(), %err, "promotion skipped"),
        }
    }

    pieces.retain(|piece| !captured.contains(&piece.id()));
    resolution
}
