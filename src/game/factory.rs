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
use std::collections::HashMap;
use std::sync::Arc;

use super::command::PieceId;
use super::machine::StateMachine;
use super::physics::PhysicsParams;
use super::piece::Piece;
use super::state::TransitionTable;
use crate::board::{Board, Cell, Material, MoveRules, PieceKind};
use crate::config::{ConfigError, PieceCatalog};

/// Everything that is shared by the pieces of one type: movement rules,
/// physics parameters and the transition table. Built once per type and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceTemplate {
    material: Material,
    rules: MoveRules,
    physics: PhysicsParams,
    transitions: TransitionTable,
    board: Board,
}

impl PieceTemplate {
    pub fn new(material: Material, rules: MoveRules, physics: PhysicsParams, board: Board) -> Self {
        Self {
            material,
            rules,
            physics,
            transitions: TransitionTable::standard(),
            board,
        }
    }

    #[inline]
    pub fn material(&self) -> Material {
        self.material
    }
    #[inline]
    pub fn rules(&self) -> &MoveRules {
        &self.rules
    }
    #[inline]
    pub fn physics(&self) -> &PhysicsParams {
        &self.physics
    }
    #[inline]
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }
}

/// Builds pieces from per-type templates. Pieces hold a handle to their
/// template and own nothing but their current state, so creating or
/// cloning a piece never copies or aliases another piece's physics.
#[derive(Debug, Clone)]
pub struct PieceFactory {
    board: Board,
    templates: HashMap<Material, Arc<PieceTemplate>>,
    counters: HashMap<Material, u32>,
}

impl PieceFactory {
    /// Builds a factory from a catalog. Every material must be present,
    /// including the queens that pawns promote to.
    pub fn new(board: Board, catalog: &PieceCatalog) -> Result<Self> {
        let mut templates = HashMap::new();
        for material in Material::all() {
            let config = catalog
                .get(material)
                .ok_or(ConfigError::MissingPiece(material))?;
            let rules = MoveRules::new(config.offsets.clone(), board.height(), board.width());
            let template = PieceTemplate::new(material, rules, config.physics, board);
            templates.insert(material, Arc::new(template));
        }
        Ok(Self {
            board,
            templates,
            counters: HashMap::new(),
        })
    }

    /// Classic chess movement with default timings.
    pub fn standard(board: Board) -> Self {
        let templates = Material::all()
            .map(|material| {
                let rules = MoveRules::standard(material.kind(), board.height(), board.width());
                let template =
                    PieceTemplate::new(material, rules, PhysicsParams::default(), board);
                (material, Arc::new(template))
            })
            .collect();
        Self {
            board,
            templates,
            counters: HashMap::new(),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn template(&self, material: Material) -> Option<&Arc<PieceTemplate>> {
        self.templates.get(&material)
    }

    fn next_id(&mut self, material: Material) -> PieceId {
        let counter = self.counters.entry(material).or_insert(0);
        *counter += 1;
        PieceId::new(material, *counter)
    }

    /// A new idle piece of `material` on `cell`, with a fresh id.
    pub fn create(&mut self, material: Material, cell: Cell) -> Result<Piece, ConfigError> {
        let template = self
            .templates
            .get(&material)
            .cloned()
            .ok_or(ConfigError::MissingPiece(material))?;
        let id = self.next_id(material);
        Ok(Piece::new(id, StateMachine::new(template, id, cell)))
    }

    /// A new piece of the same type as `piece`, idle on `cell`. Shares the
    /// template, rebuilds the physics.
    pub fn clone_to(&mut self, piece: &Piece, cell: Cell) -> Piece {
        let template = piece.template().clone();
        let id = self.next_id(piece.material());
        Piece::new(id, StateMachine::new(template, id, cell))
    }

    /// The queen that replaces `pawn` on `cell`.
    pub fn promote(&mut self, pawn: &Piece, cell: Cell) -> Result<Piece, ConfigError> {
        self.create(pawn.material().with_kind(PieceKind::Queen), cell)
    }
}
