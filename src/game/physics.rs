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

use super::state::StateKind;
use crate::board::{Board, Cell, WorldPos};

use StateKind::*;

pub const DEFAULT_SPEED_M_PER_SEC: f64 = 1.0;
pub const DEFAULT_MOVE_EXTRA_DELAY_MS: u64 = 300;
pub const DEFAULT_JUMP_DURATION_MS: u64 = 1000;
pub const DEFAULT_SHORT_REST_MS: u64 = 500;
pub const DEFAULT_LONG_REST_MS: u64 = 1500;

/// Timing parameters of one piece type, shared read-only by every
/// instance of that type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    pub speed_m_per_sec: f64,
    pub move_extra_delay_ms: u64,
    pub jump_duration_ms: u64,
    pub short_rest_ms: u64,
    pub long_rest_ms: u64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            speed_m_per_sec: DEFAULT_SPEED_M_PER_SEC,
            move_extra_delay_ms: DEFAULT_MOVE_EXTRA_DELAY_MS,
            jump_duration_ms: DEFAULT_JUMP_DURATION_MS,
            short_rest_ms: DEFAULT_SHORT_REST_MS,
            long_rest_ms: DEFAULT_LONG_REST_MS,
        }
    }
}

/// Timed position of a piece within a single state.
///
/// A fresh `Physics` is built on every transition; nothing carries over
/// from the previous state. The start time is anchored by the first call
/// to `update`, not by the time the command was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    kind: StateKind,
    start_cell: Cell,
    end_cell: Cell,
    start_pos: WorldPos,
    end_pos: WorldPos,
    pos: WorldPos,
    start_time: Option<u64>,
    duration_ms: u64,
    hold_ms: u64,
    finished: bool,
}

impl Physics {
    pub fn new(kind: StateKind, from: Cell, to: Cell, board: &Board, params: &PhysicsParams) -> Self {
        let start_pos = board.cell_to_world(from);
        let end_pos = board.cell_to_world(to);
        let (pos, duration_ms, hold_ms) = match kind {
            Idle => (end_pos, 0, 0),
            Move => {
                let speed = params.speed_m_per_sec * board.pixels_per_meter();
                let duration = (start_pos.distance(end_pos) / speed * 1000.0) as u64;
                (start_pos, duration.max(1), params.move_extra_delay_ms)
            }
            Jump => (end_pos, 0, params.jump_duration_ms),
            ShortRest => (start_pos, 0, params.short_rest_ms),
            LongRest => (start_pos, 0, params.long_rest_ms),
        };
        Self {
            kind,
            start_cell: from,
            end_cell: to,
            start_pos,
            end_pos,
            pos,
            start_time: None,
            duration_ms,
            hold_ms,
            finished: false,
        }
    }

    /// Advances to `now_ms` and reports whether the state has completed.
    /// Completion is a one-way latch; an idle state never completes.
    pub fn update(&mut self, now_ms: u64) -> bool {
        if self.finished {
            return true;
        }
        let start = *self.start_time.get_or_insert(now_ms);
        let elapsed = now_ms.saturating_sub(start);
        match self.kind {
            Idle => return false,
            Move if elapsed < self.duration_ms => {
                let t = elapsed as f64 / self.duration_ms as f64;
                self.pos = self.start_pos.lerp(self.end_pos, t);
            }
            Move => self.pos = self.end_pos,
            Jump | ShortRest | LongRest => {}
        }
        self.finished = elapsed >= self.duration_ms + self.hold_ms;
        self.finished
    }

    #[inline]
    pub fn kind(&self) -> StateKind {
        self.kind
    }
    #[inline]
    pub fn position(&self) -> WorldPos {
        self.pos
    }
    #[inline]
    pub fn start_cell(&self) -> Cell {
        self.start_cell
    }
    /// The cell the piece rests on once this state is over.
    #[inline]
    pub fn end_cell(&self) -> Cell {
        self.end_cell
    }
    #[inline]
    pub fn start_time(&self) -> Option<u64> {
        self.start_time
    }
    /// Travel time of a move, excluding the post-arrival delay.
    #[inline]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
    #[inline]
    pub fn total_ms(&self) -> u64 {
        self.duration_ms + self.hold_ms
    }
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
