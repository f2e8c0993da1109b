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

use super::events::{EventTopic, GameEvent};
use crate::board::{Pair, Side};

/// Material won by each side, fed from capture events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    points: Pair<u32>,
}

impl Score {
    pub const TOPICS: [EventTopic; 1] = [EventTopic::Capture];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self, side: Side) -> u32 {
        self.points[side]
    }

    pub fn record(&mut self, event: &GameEvent) {
        if let GameEvent::Capture {
            capturing_piece,
            captured_piece,
            ..
        } = event
        {
            let side = capturing_piece.material().side();
            self.points[side] += captured_piece.material().kind().value();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time_ms: u64,
    pub source: String,
    pub destination: String,
}

/// Committed moves of each side, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLog {
    entries: Pair<Vec<LogEntry>>,
}

impl MoveLog {
    pub const TOPICS: [EventTopic; 1] = [EventTopic::MoveCommitted];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, side: Side) -> &[LogEntry] {
        &self.entries[side]
    }

    pub fn record(&mut self, event: &GameEvent) {
        if let GameEvent::MoveCommitted {
            side,
            time_ms,
            source,
            destination,
            ..
        } = event
        {
            self.entries[*side].push(LogEntry {
                time_ms: *time_ms,
                source: source.clone(),
                destination: destination.clone(),
            });
        }
    }
}
