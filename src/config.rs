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

//! Setup-time configuration
//!
//! A match needs a board, a complete catalog of piece types and a
//! placement. The catalog is read from a directory holding one
//! sub-directory per piece code:
//!
//! ```text
//! pieces/
//!   PW/
//!     moves.txt                 one `row_offset,col_offset` per line
//!     states/
//!       idle/config.json
//!       move/config.json        {"physics": {"speed_m_per_sec": 1.5}}
//!       jump/config.json        {"physics": {"duration_ms": 1000}}
//!       short_rest/config.json
//!       long_rest/config.json
//!   KB/
//!     ...
//! ```
//!
//! Any problem found here is fatal: the match cannot start without it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::info;

use crate::board::{Board, Cell, Material, MoveRules, Offset};
use crate::game::{PhysicsParams, StateKind};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration for piece {0}")]
    MissingPiece(Material),
    #[error("{material}: speed must be positive, got {speed}")]
    BadSpeed { material: Material, speed: f64 },
    #[error("placement row {row}, column {col}: {reason}")]
    BadPlacement { row: usize, col: usize, reason: String },
    #[error("board dimensions must be positive: {0:?}")]
    BadBoard(Board),
    #[error("placement does not fit a {width}x{height} board")]
    PlacementSize { width: i32, height: i32 },
}

/// Board geometry, read from `game.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width_cells: i32,
    pub height_cells: i32,
    pub cell_w_px: i32,
    pub cell_h_px: i32,
    pub cell_w_m: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width_cells: 8,
            height_cells: 8,
            cell_w_px: 100,
            cell_h_px: 100,
            cell_w_m: 1,
        }
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.board()?;
        Ok(config)
    }

    pub fn board(&self) -> Result<Board, ConfigError> {
        let board = Board::new(
            self.width_cells,
            self.height_cells,
            self.cell_w_px,
            self.cell_h_px,
        )
        .with_cell_meters(self.cell_w_m);
        if !board.is_well_formed() {
            return Err(ConfigError::BadBoard(board));
        }
        Ok(board)
    }
}

/// Contents of a `states/<state>/config.json` file. Only the physics
/// section matters to the engine; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StateConfig {
    #[serde(default)]
    pub physics: StatePhysics,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatePhysics {
    pub speed_m_per_sec: Option<f64>,
    pub duration_ms: Option<u64>,
    pub extra_delay_ms: Option<u64>,
}

impl StateConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Folds the per-state configs of one piece type into its parameters.
/// Absent values keep their defaults.
pub fn physics_params(states: &HashMap<StateKind, StateConfig>) -> PhysicsParams {
    let mut params = PhysicsParams::default();
    let physics = |kind: StateKind| states.get(&kind).map(|config| &config.physics);
    if let Some(p) = physics(StateKind::Move) {
        params.speed_m_per_sec = p.speed_m_per_sec.unwrap_or(params.speed_m_per_sec);
        params.move_extra_delay_ms = p.extra_delay_ms.unwrap_or(params.move_extra_delay_ms);
    }
    if let Some(ms) = physics(StateKind::Jump).and_then(|p| p.duration_ms) {
        params.jump_duration_ms = ms;
    }
    if let Some(ms) = physics(StateKind::ShortRest).and_then(|p| p.duration_ms) {
        params.short_rest_ms = ms;
    }
    if let Some(ms) = physics(StateKind::LongRest).and_then(|p| p.duration_ms) {
        params.long_rest_ms = ms;
    }
    params
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieceConfig {
    pub offsets: Vec<Offset>,
    pub physics: PhysicsParams,
}

/// Movement offsets and physics parameters per piece type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PieceCatalog {
    entries: HashMap<Material, PieceConfig>,
}

impl PieceCatalog {
    /// Classic chess movement and default timings for every material.
    pub fn standard(board: &Board) -> Self {
        let entries = Material::all()
            .map(|material| {
                let rules = MoveRules::standard(material.kind(), board.height(), board.width());
                let config = PieceConfig {
                    offsets: rules.offsets().to_vec(),
                    physics: PhysicsParams::default(),
                };
                (material, config)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, material: Material) -> Option<&PieceConfig> {
        self.entries.get(&material)
    }

    pub fn insert(&mut self, material: Material, config: PieceConfig) -> Result<()> {
        let speed = config.physics.speed_m_per_sec;
        if speed.is_nan() || speed <= 0.0 {
            return Err(ConfigError::BadSpeed { material, speed }.into());
        }
        self.entries.insert(material, config);
        Ok(())
    }

    pub fn remove(&mut self, material: Material) -> Option<PieceConfig> {
        self.entries.remove(&material)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads every material from `root`. Missing directories, files or
    /// malformed contents are errors.
    pub fn load_dir(root: &Path, board: &Board) -> Result<Self> {
        let mut catalog = Self::default();
        for material in Material::all() {
            let dir = root.join(material.code());
            if !dir.is_dir() {
                return Err(ConfigError::MissingPiece(material).into());
            }
            let moves_path = dir.join("moves.txt");
            let text = fs::read_to_string(&moves_path)
                .with_context(|| format!("reading {}", moves_path.display()))?;
            let rules = MoveRules::parse(&text, board.height(), board.width())
                .with_context(|| format!("parsing {}", moves_path.display()))?;

            let mut states = HashMap::new();
            for kind in StateKind::iter() {
                let name = kind.to_string().to_ascii_lowercase();
                let path = dir.join("states").join(&name).join("config.json");
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let config = StateConfig::from_json(&text)
                    .with_context(|| format!("parsing {}", path.display()))?;
                states.insert(kind, config);
            }
            let config = PieceConfig {
                offsets: rules.offsets().to_vec(),
                physics: physics_params(&states),
            };
            catalog.insert(material, config)?;
        }
        info!(root = %root.display(), pieces = catalog.len(), "loaded piece catalog");
        Ok(catalog)
    }
}

/// Starting cells of the pieces of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pieces: Vec<(Material, Cell)>,
}

impl Placement {
    pub fn new(pieces: Vec<(Material, Cell)>) -> Self {
        Self { pieces }
    }

    /// Parses a CSV grid, one board row per line. Each field is empty or a
    /// piece code such as `RW`.
    pub fn parse(text: &str, board: &Board) -> Result<Self> {
        let mut pieces = Vec::new();
        for (row, line) in text.lines().enumerate() {
            for (col, field) in line.split(',').enumerate() {
                let code = field.trim();
                if code.is_empty() {
                    continue;
                }
                let material: Material = code.parse().map_err(|e| ConfigError::BadPlacement {
                    row,
                    col,
                    reason: format!("{e}"),
                })?;
                let cell = Cell::new(row as i32, col as i32);
                if !board.contains(cell) {
                    return Err(ConfigError::PlacementSize {
                        width: board.width(),
                        height: board.height(),
                    }
                    .into());
                }
                pieces.push((material, cell));
            }
        }
        Ok(Self { pieces })
    }

    /// The classic starting position on an 8x8 board.
    pub fn standard() -> Self {
        const GRID: &str = "\
RB,NB,BB,QB,KB,BB,NB,RB
PB,PB,PB,PB,PB,PB,PB,PB
,,,,,,,
,,,,,,,
,,,,,,,
,,,,,,,
PW,PW,PW,PW,PW,PW,PW,PW
RW,NW,BW,QW,KW,BW,NW,RW";
        let mut pieces = Vec::new();
        for (row, line) in GRID.lines().enumerate() {
            for (col, code) in line.split(',').enumerate() {
                if let Ok(material) = code.parse::<Material>() {
                    pieces.push((material, Cell::new(row as i32, col as i32)));
                }
            }
        }
        Self { pieces }
    }

    pub fn pieces(&self) -> &[(Material, Cell)] {
        &self.pieces
    }
}
