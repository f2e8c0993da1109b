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
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// The five states a piece can be in.
///
/// Also used as the kind of a `Command`: a command asks a piece to enter
/// the named state.
#[derive(
    Debug, Serialize, Deserialize, Display, EnumString, Clone, Copy, PartialEq, Eq, Hash, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum StateKind {
    Idle,
    Move,
    Jump,
    ShortRest,
    LongRest,
}

use StateKind::*;

impl StateKind {
    #[inline]
    pub const fn to_index(&self) -> usize {
        *self as usize
    }

    #[inline]
    pub const fn can_be_captured(&self) -> bool {
        match self {
            Idle | Move | ShortRest | LongRest => true,
            Jump => false,
        }
    }

    #[inline]
    pub const fn can_capture(&self) -> bool {
        match self {
            Idle | Move => true,
            Jump | ShortRest | LongRest => false,
        }
    }

    /// Idle or cooling down.
    #[inline]
    pub const fn is_stationary(&self) -> bool {
        match self {
            Idle | ShortRest | LongRest => true,
            Move | Jump => false,
        }
    }

    /// True for the kinds that carry a piece to another cell.
    #[inline]
    pub const fn is_travel(&self) -> bool {
        matches!(self, Move | Jump)
    }
}

/// Outgoing edges of every state kind, plus the edge taken automatically
/// when a state's physics completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    edges: [Vec<StateKind>; 5],
    completion: [Option<StateKind>; 5],
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TransitionTable {
    pub fn standard() -> Self {
        let mut edges: [Vec<StateKind>; 5] = Default::default();
        let mut completion = [None; 5];
        for kind in StateKind::iter() {
            let (accepts, next): (&[StateKind], Option<StateKind>) = match kind {
                Idle => (&[Move, Jump], None),
                Move => (&[LongRest], Some(LongRest)),
                Jump => (&[ShortRest], Some(ShortRest)),
                LongRest => (&[Idle], Some(Idle)),
                ShortRest => (&[Idle], Some(Idle)),
            };
            edges[kind.to_index()] = accepts.to_vec();
            completion[kind.to_index()] = next;
        }
        Self { edges, completion }
    }

    pub fn edges(&self, from: StateKind) -> &[StateKind] {
        &self.edges[from.to_index()]
    }

    pub fn accepts(&self, from: StateKind, to: StateKind) -> bool {
        self.edges(from).contains(&to)
    }

    /// Whether a command may move a piece from `from` to `to`. Only states
    /// that end on a command accept one; timed states run to completion.
    pub fn accepts_command(&self, from: StateKind, to: StateKind) -> bool {
        self.on_completion(from).is_none() && self.accepts(from, to)
    }

    /// The state entered once `from` finishes, `None` for states that
    /// only end on an external command.
    pub fn on_completion(&self, from: StateKind) -> Option<StateKind> {
        self.completion[from.to_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_capture_table() {
        let table: Vec<(bool, bool)> = StateKind::iter()
            .map(|k| (k.can_be_captured(), k.can_capture()))
            .collect();
        assert_eq!(
            table,
            vec![
                (true, true),
                (true, true),
                (false, false),
                (true, false),
                (true, false)
            ]
        );
    }
    #[test]
    fn test_standard_transitions() {
        let table = TransitionTable::standard();
        assert!(table.accepts(Idle, Move));
        assert!(table.accepts(Idle, Jump));
        assert!(!table.accepts(Idle, Idle));
        assert!(!table.accepts(Move, Move));
        assert!(!table.accepts(Move, Jump));
        assert!(table.accepts(Move, LongRest));
        assert!(table.accepts(Jump, ShortRest));
        assert!(table.accepts(LongRest, Idle));
        assert!(!table.accepts(ShortRest, Move));
    }
    #[test]
    fn test_commands_only_leave_idle() {
        let table = TransitionTable::standard();
        assert!(table.accepts_command(Idle, Move));
        assert!(table.accepts_command(Idle, Jump));
        assert!(!table.accepts_command(Move, LongRest));
        assert!(!table.accepts_command(Jump, ShortRest));
        assert!(!table.accepts_command(LongRest, Idle));
        assert!(!table.accepts_command(ShortRest, Idle));
    }
    #[test]
    fn test_completion_edges() {
        let table = TransitionTable::standard();
        assert_eq!(table.on_completion(Idle), None);
        assert_eq!(table.on_completion(Move), Some(LongRest));
        assert_eq!(table.on_completion(Jump), Some(ShortRest));
        assert_eq!(table.on_completion(LongRest), Some(Idle));
        assert_eq!(table.on_completion(ShortRest), Some(Idle));
    }
    #[test]
    fn test_names() {
        assert_eq!(StateKind::from_str("short_rest").unwrap(), ShortRest);
        assert_eq!(StateKind::from_str("MOVE").unwrap(), Move);
        assert_eq!(LongRest.to_string(), "LONG_REST");
        assert!(StateKind::from_str("fly").is_err());
    }
}
