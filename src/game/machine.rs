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
use tracing::debug;

use super::command::{Command, CommandError, PieceId};
use super::factory::PieceTemplate;
use super::physics::Physics;
use super::state::StateKind;
use crate::board::Cell;

/// Per-instance mutable state of a piece: the active command, its physics
/// and the history of commands entered so far. Everything that is the
/// same for all pieces of a type lives in the shared `PieceTemplate`.
#[derive(Debug, Clone)]
pub struct StateMachine {
    template: Arc<PieceTemplate>,
    command: Command,
    physics: Physics,
    history: Vec<Command>,
}

impl StateMachine {
    /// An idle machine standing on `cell`.
    pub fn new(template: Arc<PieceTemplate>, piece_id: PieceId, cell: Cell) -> Self {
        let command = Command::new(0, piece_id, StateKind::Idle, cell, cell);
        let physics = Physics::new(
            StateKind::Idle,
            cell,
            cell,
            template.board(),
            template.physics(),
        );
        Self {
            template,
            command: command.clone(),
            physics,
            history: vec![command],
        }
    }

    #[inline]
    pub fn template(&self) -> &Arc<PieceTemplate> {
        &self.template
    }
    #[inline]
    pub fn kind(&self) -> StateKind {
        self.physics.kind()
    }
    #[inline]
    pub fn command(&self) -> &Command {
        &self.command
    }
    #[inline]
    pub fn physics(&self) -> &Physics {
        &self.physics
    }
    #[inline]
    pub fn history(&self) -> &[Command] {
        &self.history
    }

    /// The cell the piece stands on, or is bound for while travelling.
    #[inline]
    pub fn cell(&self) -> Cell {
        self.physics.end_cell()
    }

    /// Enters the state named by `command`. Travel commands head for the
    /// command's destination, every other kind stays on the current cell.
    pub fn reset(&mut self, command: Command) -> Result<(), CommandError> {
        let from = self.cell();
        let to = if command.kind().is_travel() {
            command.destination().resolve(self.template.board())?
        } else {
            from
        };
        self.enter(command, from, to);
        Ok(())
    }

    fn enter(&mut self, command: Command, from: Cell, to: Cell) {
        self.physics = Physics::new(
            command.kind(),
            from,
            to,
            self.template.board(),
            self.template.physics(),
        );
        self.history.push(command.clone());
        self.command = command;
    }

    /// Advances the physics. When the active state completes, the
    /// completion edge is taken with a synthesized command on the cell the
    /// piece ended up on. Returns the state entered, if any.
    pub fn update(&mut self, now_ms: u64) -> Option<StateKind> {
        if !self.physics.update(now_ms) {
            return None;
        }
        let next = self.template.transitions().on_completion(self.kind())?;
        let cell = self.physics.end_cell();
        let command = Command::new(now_ms, self.command.piece_id(), next, cell, cell);
        debug!(piece = %self.command.piece_id(), from = %self.kind(), to = %next, "state completed");
        self.enter(command, cell, cell);
        Some(next)
    }

    /// Validates `command` against the transition table and, for moves,
    /// the movement rules. Edges taken on completion are never accepted
    /// from a command. `dst_empty` tells whether the destination is
    /// free of other pieces; pawns need it to tell advances from captures.
    pub fn check_command(&self, command: &Command, dst_empty: bool) -> Result<(), CommandError> {
        let (state, wanted) = (self.kind(), command.kind());
        if !self.template.transitions().accepts_command(state, wanted) {
            return Err(CommandError::IllegalTransition {
                from: state,
                to: wanted,
            });
        }
        if wanted != StateKind::Move {
            return Ok(());
        }
        let from = self.cell();
        let to = command.destination().resolve(self.template.board())?;
        let legal = if self.template.material().kind().is_pawn() {
            self.is_pawn_move(from, to, dst_empty)
        } else {
            self.template.rules().allows(from, to)
        };
        if legal {
            Ok(())
        } else {
            Err(CommandError::IllegalMove { from, to })
        }
    }

    pub fn is_command_possible(&self, command: &Command, dst_empty: bool) -> bool {
        self.check_command(command, dst_empty).is_ok()
    }

    fn is_pawn_move(&self, from: Cell, to: Cell, dst_empty: bool) -> bool {
        let side = self.template.material().side();
        let forward = side.forward();
        let offset = to - from;
        let single = offset.cols == 0 && offset.rows == forward && dst_empty;
        let double = from.row == self.template.board().pawn_rank(side)
            && offset.cols == 0
            && offset.rows == 2 * forward
            && dst_empty;
        let capture = offset.cols.abs() == 1 && offset.rows == forward && !dst_empty;
        single || double || capture
    }
}
