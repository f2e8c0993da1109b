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

//! Kung-fu chess: chess without turns.
//!
//! Pieces move continuously, several of them at once, and captures are
//! decided by who got there first. A [`Simulation`] owns the pieces and
//! is driven by ticks; input threads feed it [`Command`]s through a
//! [`CommandSender`] and collaborators (sound, score, network) listen to
//! the [`GameEvent`]s it publishes.

pub mod board;
pub mod config;
pub mod game;

pub use board::{Board, Cell, Material, PieceKind, Side};
pub use game::{Command, CommandSender, GameEvent, MatchStatus, Simulation, StateKind};
