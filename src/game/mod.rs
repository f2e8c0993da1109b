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

//! Real-time simulation
//!
//! There are no turns. Every piece runs its own state machine:
//!
//! ```text
//! Idle --command--> Move --arrived--> LongRest --> Idle
//! Idle --command--> Jump --landed---> ShortRest --> Idle
//! ```
//!
//! Each tick advances the physics of every piece, settles collisions on
//! the cells pieces currently stand on, promotes pawns and then applies
//! the commands queued since the previous tick.

#[cfg(feature = "random")]
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::board::Side;

mod command;
mod events;
mod factory;
mod machine;
mod physics;
mod piece;
mod resolver;
mod score;
mod simulation;
mod snapshot;
mod state;

pub use command::{CellRef, Command, CommandError, PieceId};
pub use events::{EventBus, EventMessage, EventTopic, GameEvent};
pub use factory::{PieceFactory, PieceTemplate};
pub use machine::StateMachine;
pub use physics::{Physics, PhysicsParams};
pub use piece::Piece;
pub use resolver::{resolve, should_capture, Capture, OccupancyMap, Promotion, Resolution};
pub use score::{LogEntry, MoveLog, Score};
pub use simulation::{CommandSender, MatchClock, Simulation, DEFAULT_TICK};
pub use snapshot::{BoardSnapshot, PieceSnapshot};
pub use state::{StateKind, TransitionTable};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MatchId(u64);

impl MatchId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
    #[cfg(feature = "random")]
    pub fn random() -> Self {
        Self(thread_rng().gen())
    }
}

impl Default for MatchId {
    #[cfg(feature = "random")]
    fn default() -> Self {
        Self::random()
    }
    #[cfg(not(feature = "random"))]
    fn default() -> Self {
        Self(0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStatus {
    Running,
    /// `winner` is `None` when no side is left with a lone king.
    Terminated { winner: Option<Side> },
}

impl MatchStatus {
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, MatchStatus::Running)
    }
    pub fn winner(&self) -> Option<Side> {
        match self {
            MatchStatus::Running => None,
            MatchStatus::Terminated { winner } => *winner,
        }
    }
}
