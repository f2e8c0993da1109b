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

use std::sync::Arc;

use super::command::{Command, CommandError, PieceId};
use super::factory::PieceTemplate;
use super::machine::StateMachine;
use super::physics::Physics;
use super::state::StateKind;
use crate::board::{Cell, Material, PieceKind, Side, WorldPos};

/// A piece on the board. Its position is derived from the physics of its
/// current state; there is no separately stored location.
#[derive(Debug, Clone)]
pub struct Piece {
    id: PieceId,
    machine: StateMachine,
}

impl Piece {
    pub fn new(id: PieceId, machine: StateMachine) -> Self {
        Self { id, machine }
    }

    #[inline]
    pub fn id(&self) -> PieceId {
        self.id
    }
    #[inline]
    pub fn material(&self) -> Material {
        self.id.material()
    }
    #[inline]
    pub fn side(&self) -> Side {
        self.material().side()
    }
    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.material().kind()
    }
    #[inline]
    pub fn template(&self) -> &Arc<PieceTemplate> {
        self.machine.template()
    }
    #[inline]
    pub fn state_kind(&self) -> StateKind {
        self.machine.kind()
    }
    #[inline]
    pub fn physics(&self) -> &Physics {
        self.machine.physics()
    }
    #[inline]
    pub fn command(&self) -> &Command {
        self.machine.command()
    }
    #[inline]
    pub fn history(&self) -> &[Command] {
        self.machine.history()
    }
    #[inline]
    pub fn position(&self) -> WorldPos {
        self.physics().position()
    }
    #[inline]
    pub fn cell(&self) -> Cell {
        self.machine.cell()
    }
    #[inline]
    pub fn start_time(&self) -> Option<u64> {
        self.physics().start_time()
    }

    #[inline]
    pub fn can_be_captured(&self) -> bool {
        self.state_kind().can_be_captured()
    }
    #[inline]
    pub fn can_capture(&self) -> bool {
        self.state_kind().can_capture()
    }
    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.state_kind().is_stationary()
    }

    pub fn is_command_possible(&self, command: &Command, dst_empty: bool) -> bool {
        self.machine.is_command_possible(command, dst_empty)
    }

    /// Validates and, if legal, enters the state named by `command`.
    /// A rejected command leaves the piece untouched.
    pub fn submit(&mut self, command: Command, dst_empty: bool) -> Result<(), CommandError> {
        self.machine.check_command(&command, dst_empty)?;
        self.machine.reset(command)
    }

    pub fn update(&mut self, now_ms: u64) -> Option<StateKind> {
        self.machine.update(now_ms)
    }
}
