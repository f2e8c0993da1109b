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

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::thread::{self, JoinHandle};
use strum::IntoEnumIterator;
use strum_macros::{EnumDiscriminants, EnumIter};
use tracing::debug;

use super::command::PieceId;
use crate::board::{Cell, Side};

/// Domain events published by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(EventTopic), derive(Hash, EnumIter, Serialize, Deserialize))]
pub enum GameEvent {
    MoveCommitted {
        piece: PieceId,
        side: Side,
        time_ms: u64,
        source: String,
        destination: String,
    },
    Jump {
        piece: PieceId,
        side: Side,
        time_ms: u64,
        source: String,
        destination: String,
    },
    Capture {
        capturing_piece: PieceId,
        captured_piece: PieceId,
        cell: Cell,
    },
    Promotion {
        old_id: PieceId,
        new_id: PieceId,
        cell: Cell,
    },
    /// `winning_side` is `None` when the match ends without a winner.
    Victory { winning_side: Option<Side> },
}

impl GameEvent {
    pub fn topic(&self) -> EventTopic {
        self.into()
    }

    /// Sound hint for the audio collaborator.
    pub fn sound(&self) -> &'static str {
        match self {
            GameEvent::MoveCommitted { .. } => "move.wav",
            GameEvent::Jump { .. } => "jump.wav",
            GameEvent::Capture { .. } => "capture.wav",
            GameEvent::Promotion { .. } => "promotion.wav",
            GameEvent::Victory { .. } => "victory.wav",
        }
    }

    pub fn message(&self) -> EventMessage<'_> {
        EventMessage {
            sound: self.sound(),
            event: self,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.message())
    }
}

/// An event as sent to remote peers: the event plus its sound hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMessage<'a> {
    pub sound: &'static str,
    #[serde(flatten)]
    pub event: &'a GameEvent,
}

struct Subscriber {
    topics: HashSet<EventTopic>,
    sender: Sender<GameEvent>,
}

/// Publish/subscribe channel from the simulation to its collaborators.
///
/// Each subscriber gets its own unbounded channel, so publishing never
/// blocks on a slow consumer. Subscribers whose receiving end is gone are
/// dropped on the next publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, topics: &[EventTopic]) -> Receiver<GameEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(Subscriber {
            topics: topics.iter().copied().collect(),
            sender,
        });
        receiver
    }

    pub fn subscribe_all(&mut self) -> Receiver<GameEvent> {
        let topics: Vec<EventTopic> = EventTopic::iter().collect();
        self.subscribe(&topics)
    }

    /// Runs `handler` on a background thread for every event of the given
    /// topics. The thread exits once the bus is dropped.
    pub fn spawn_listener<F>(&mut self, topics: &[EventTopic], mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(GameEvent) + Send + 'static,
    {
        let receiver = self.subscribe(topics);
        thread::spawn(move || {
            for event in receiver.iter() {
                handler(event);
            }
        })
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn publish(&mut self, event: GameEvent) {
        let topic = event.topic();
        self.subscribers.retain(|subscriber| {
            if !subscriber.topics.contains(&topic) {
                return true;
            }
            let delivered = subscriber.sender.send(event.clone()).is_ok();
            if !delivered {
                debug!(?topic, "dropping disconnected subscriber");
            }
            delivered
        });
    }
}
