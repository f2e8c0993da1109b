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

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::command::{Command, CommandError};
use super::events::{EventBus, EventTopic, GameEvent};
use super::factory::PieceFactory;
use super::piece::Piece;
use super::resolver::{resolve, OccupancyMap};
use super::snapshot::BoardSnapshot;
use super::state::StateKind;
use super::{MatchId, MatchStatus};
use crate::board::{Board, Cell, Side};
use crate::config::{ConfigError, GameConfig, PieceCatalog, Placement};

pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Milliseconds elapsed since the match started.
#[derive(Debug, Clone, Copy)]
pub struct MatchClock {
    started: Instant,
}

impl MatchClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
    pub fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Producer end of the command queue. Cheap to clone, one per input
/// thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<Command>,
}

impl CommandSender {
    /// Enqueues `command`. Returns false once the simulation is gone.
    pub fn send(&self, command: Command) -> bool {
        self.sender.send(command).is_ok()
    }

    /// Enqueues a command received as JSON.
    pub fn send_json(&self, text: &str) -> Result<()> {
        let command = Command::from_json(text).context("malformed command")?;
        if !self.send(command) {
            return Err(anyhow!("simulation has stopped"));
        }
        Ok(())
    }
}

/// One match: the live pieces, the occupancy of the last tick and the
/// queue of pending commands.
///
/// The simulation is the only writer of piece state. Other threads talk
/// to it through `CommandSender`s and listen through the `EventBus`.
pub struct Simulation {
    id: MatchId,
    factory: PieceFactory,
    pieces: Vec<Piece>,
    occupancy: OccupancyMap,
    events: EventBus,
    sender: Sender<Command>,
    commands: Receiver<Command>,
    clock: MatchClock,
    status: MatchStatus,
}

impl Simulation {
    pub fn new(mut factory: PieceFactory, placement: &Placement) -> Result<Self> {
        let board = *factory.board();
        if !board.is_well_formed() {
            return Err(ConfigError::BadBoard(board).into());
        }
        let mut pieces: Vec<Piece> = Vec::with_capacity(placement.pieces().len());
        for (material, cell) in placement.pieces().iter().copied() {
            if !board.contains(cell) {
                return Err(ConfigError::PlacementSize {
                    width: board.width(),
                    height: board.height(),
                }
                .into());
            }
            if pieces.iter().any(|piece| piece.cell() == cell) {
                return Err(ConfigError::BadPlacement {
                    row: cell.row as usize,
                    col: cell.col as usize,
                    reason: "cell already taken".to_string(),
                }
                .into());
            }
            pieces.push(factory.create(material, cell)?);
        }
        let mut occupancy = OccupancyMap::new();
        resolve(&mut pieces, &mut occupancy, &mut factory);
        let (sender, commands) = unbounded();
        Ok(Self {
            id: MatchId::default(),
            factory,
            pieces,
            occupancy,
            events: EventBus::new(),
            sender,
            commands,
            clock: MatchClock::start(),
            status: MatchStatus::Running,
        })
    }

    /// The classic starting position with default timings.
    pub fn standard() -> Result<Self> {
        Self::new(PieceFactory::standard(Board::default()), &Placement::standard())
    }

    /// Sets up a match from a directory holding an optional `game.json`,
    /// the piece catalog under `pieces/` and the placement in `board.csv`.
    pub fn from_config_dir(root: &Path) -> Result<Self> {
        let game_path = root.join("game.json");
        let game = if game_path.is_file() {
            let text = fs::read_to_string(&game_path)
                .with_context(|| format!("reading {}", game_path.display()))?;
            GameConfig::from_json(&text)
                .with_context(|| format!("parsing {}", game_path.display()))?
        } else {
            GameConfig::default()
        };
        let board = game.board()?;
        let catalog = PieceCatalog::load_dir(&root.join("pieces"), &board)?;
        let factory = PieceFactory::new(board, &catalog)?;
        let board_path = root.join("board.csv");
        let text = fs::read_to_string(&board_path)
            .with_context(|| format!("reading {}", board_path.display()))?;
        let placement = Placement::parse(&text, &board)
            .with_context(|| format!("parsing {}", board_path.display()))?;
        Self::new(factory, &placement)
    }

    pub fn with_id(mut self, id: MatchId) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn id(&self) -> MatchId {
        self.id
    }
    #[inline]
    pub fn board(&self) -> &Board {
        self.factory.board()
    }
    #[inline]
    pub fn status(&self) -> MatchStatus {
        self.status
    }
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }
    #[inline]
    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }
    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        let id = self.occupancy.get(cell)?;
        self.pieces.iter().find(|piece| piece.id() == id)
    }

    pub fn command_sender(&self) -> CommandSender {
        CommandSender {
            sender: self.sender.clone(),
        }
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn subscribe(&mut self, topics: &[EventTopic]) -> Receiver<GameEvent> {
        self.events.subscribe(topics)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::new(&self.pieces, self.factory.board())
    }

    /// Advances the match to `now_ms`: physics first, then collisions and
    /// promotions, then the commands queued since the last tick in the
    /// order they were sent. Does nothing once the match is over.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.status.is_running() {
            return;
        }
        for piece in self.pieces.iter_mut() {
            piece.update(now_ms);
        }

        let resolution = resolve(&mut self.pieces, &mut self.occupancy, &mut self.factory);
        for capture in resolution.captures {
            self.events.publish(GameEvent::Capture {
                capturing_piece: capture.capturing,
                captured_piece: capture.captured,
                cell: capture.cell,
            });
        }
        for promotion in resolution.promotions {
            self.events.publish(GameEvent::Promotion {
                old_id: promotion.old_id,
                new_id: promotion.new_id,
                cell: promotion.cell,
            });
        }

        let pending = self.commands.len();
        let commands: Vec<Command> = self.commands.try_iter().take(pending).collect();
        for command in commands {
            let piece = command.piece_id();
            match self.apply_command(command, now_ms) {
                Ok(()) => {}
                Err(err @ CommandError::Malformed(_)) => warn!(%piece, %err, "dropped command"),
                Err(err) => debug!(%piece, %err, "rejected command"),
            }
        }

        self.check_termination();
    }

    /// Validates `command` against the current occupancy and the piece's
    /// own rules, and enters it if legal.
    pub fn apply_command(&mut self, command: Command, now_ms: u64) -> Result<(), CommandError> {
        if !self.status.is_running() {
            return Err(CommandError::Terminated);
        }
        let board = *self.factory.board();
        let (src, dst) = command.cells(&board)?;
        let id = self.occupancy.get(src).ok_or(CommandError::EmptySource(src))?;
        if id != command.piece_id() {
            return Err(CommandError::UnknownPiece {
                named: command.piece_id(),
                found: id,
            });
        }
        let target = self.occupancy.get(dst).filter(|target| *target != id);
        if matches!(target, Some(target) if target.material().side() == id.material().side()) {
            return Err(CommandError::FriendlyOccupant(dst));
        }
        if command.kind() == StateKind::Move {
            self.check_path(src, dst)?;
        }
        let piece = self
            .pieces
            .iter_mut()
            .find(|piece| piece.id() == id)
            .ok_or(CommandError::EmptySource(src))?;
        let side = piece.side();
        let (kind, time_ms) = (command.kind(), command.timestamp_ms());
        piece.submit(command, target.is_none())?;
        debug!(piece = %id, %kind, %src, %dst, now_ms, "command accepted");

        let (source, destination) = (board.cell_to_algebraic(src), board.cell_to_algebraic(dst));
        match kind {
            StateKind::Move => self.events.publish(GameEvent::MoveCommitted {
                piece: id,
                side,
                time_ms,
                source,
                destination,
            }),
            StateKind::Jump => self.events.publish(GameEvent::Jump {
                piece: id,
                side,
                time_ms,
                source,
                destination,
            }),
            _ => {}
        }
        Ok(())
    }

    /// Rejects straight and diagonal moves whose intermediate cells are
    /// occupied. Other offsets have no path to check.
    fn check_path(&self, from: Cell, to: Cell) -> Result<(), CommandError> {
        let Some(step) = (to - from).to_unit() else {
            return Ok(());
        };
        let mut cell = from + step;
        while cell != to {
            if self.occupancy.is_occupied(cell) {
                return Err(CommandError::PathBlocked(cell));
            }
            cell = cell + step;
        }
        Ok(())
    }

    /// The match ends when at most one king is left, or when nothing but
    /// kings is left.
    fn check_termination(&mut self) {
        let kings: Vec<Side> = self
            .pieces
            .iter()
            .filter(|piece| piece.kind().is_king())
            .map(|piece| piece.side())
            .collect();
        let bare_kings = kings.len() == self.pieces.len();
        if kings.len() > 1 && !bare_kings {
            return;
        }
        let winner = match kings.as_slice() {
            [side] => Some(*side),
            _ => None,
        };
        info!(id = ?self.id, ?winner, "match terminated");
        self.status = MatchStatus::Terminated { winner };
        self.events.publish(GameEvent::Victory {
            winning_side: winner,
        });
    }

    /// Ticks against the match clock every `interval` until the match is
    /// over. Returns the winning side, if any.
    pub fn run(&mut self, interval: Duration) -> Option<Side> {
        while self.status.is_running() {
            self.tick(self.clock.now_ms());
            if self.status.is_running() {
                thread::sleep(interval);
            }
        }
        self.status.winner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Material, PieceKind};
    use crate::config::PieceConfig;
    use crate::game::{PhysicsParams, PieceId};

    fn simulation(pieces: &[(Material, (i32, i32))]) -> Simulation {
        let placement = Placement::new(
            pieces
                .iter()
                .map(|(material, cell)| (*material, Cell::from(*cell)))
                .collect(),
        );
        Simulation::new(PieceFactory::standard(Board::default()), &placement).unwrap()
    }

    fn id_at(sim: &Simulation, cell: (i32, i32)) -> PieceId {
        sim.piece_at(cell.into()).unwrap().id()
    }

    fn order(sim: &Simulation, kind: StateKind, from: &str, to: &str, now: u64) -> Command {
        let cell = sim.board().algebraic_to_cell(from).unwrap();
        Command::new(now, id_at(sim, (cell.row, cell.col)), kind, from, to)
    }

    fn find(sim: &Simulation, id: PieceId) -> Option<&Piece> {
        sim.pieces().iter().find(|piece| piece.id() == id)
    }

    #[test]
    fn test_standard_setup() {
        let sim = Simulation::standard().unwrap();
        assert_eq!(sim.pieces().len(), 32);
        assert_eq!(sim.occupancy().len(), 32);
        assert_eq!(sim.status(), MatchStatus::Running);
        assert_eq!(sim.piece_at(Cell::new(7, 4)).unwrap().material(), Material::WK);
        assert!(sim.pieces().iter().all(|p| p.state_kind() == StateKind::Idle));
    }
    #[test]
    fn test_from_config_dir() {
        let root = std::env::temp_dir().join(format!("kungfu-chess-sim-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let board = Board::default();
        let catalog = PieceCatalog::standard(&board);
        for material in Material::all() {
            let dir = root.join("pieces").join(material.code());
            let moves: String = catalog
                .get(material)
                .unwrap()
                .offsets
                .iter()
                .map(|o| format!("{},{}\n", o.rows, o.cols))
                .collect();
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("moves.txt"), moves).unwrap();
            for kind in ["idle", "move", "jump", "short_rest", "long_rest"] {
                let state = dir.join("states").join(kind);
                fs::create_dir_all(&state).unwrap();
                fs::write(state.join("config.json"), "{}").unwrap();
            }
        }
        assert!(Simulation::from_config_dir(&root).is_err());
        fs::write(root.join("board.csv"), "KB,,,,,,,\n\n\n\n\n\n\nKW,RW\n").unwrap();
        fs::write(root.join("game.json"), r#"{"cell_w_px": 0}"#).unwrap();
        let err = Simulation::from_config_dir(&root).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::BadBoard(_))
        ));
        fs::write(root.join("game.json"), r#"{"cell_w_px": 50, "cell_h_px": 50}"#).unwrap();
        let sim = Simulation::from_config_dir(&root).unwrap();
        assert_eq!(sim.pieces().len(), 3);
        assert_eq!(sim.board().cell_w_px(), 50);
        assert_eq!(sim.piece_at(Cell::new(7, 1)).unwrap().material(), Material::WR);
        let _ = fs::remove_dir_all(&root);
    }
    #[test]
    fn test_duplicate_placement_is_fatal() {
        let placement = Placement::new(vec![
            (Material::WK, Cell::new(7, 4)),
            (Material::BK, Cell::new(7, 4)),
        ]);
        let err = Simulation::new(PieceFactory::standard(Board::default()), &placement);
        assert!(err.is_err());
        let placement = Placement::new(vec![(Material::WK, Cell::new(8, 4))]);
        let err = Simulation::new(PieceFactory::standard(Board::default()), &placement);
        assert!(err.is_err());
    }
    #[test]
    fn test_degenerate_board_is_fatal() {
        let factory = PieceFactory::standard(Board::new(8, 8, 0, 100));
        let placement = Placement::new(vec![(Material::WK, Cell::new(7, 4))]);
        let err = Simulation::new(factory, &placement).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::BadBoard(_))
        ));
    }
    #[test]
    fn test_pawn_opening_cycle() {
        let mut sim = Simulation::standard().unwrap();
        let moves = sim.subscribe(&[EventTopic::MoveCommitted]);
        let pawn = id_at(&sim, (6, 4));
        sim.apply_command(order(&sim, StateKind::Move, "e2", "e4", 0), 0)
            .unwrap();
        let state = |sim: &Simulation| find(sim, pawn).unwrap().state_kind();
        assert_eq!(state(&sim), StateKind::Move);
        sim.tick(0);
        assert_eq!(find(&sim, pawn).unwrap().physics().duration_ms(), 2000);
        sim.tick(1000);
        assert!(sim.piece_at(Cell::new(5, 4)).is_some());
        sim.tick(2000);
        assert_eq!(state(&sim), StateKind::Move);
        sim.tick(2300);
        assert_eq!(state(&sim), StateKind::LongRest);
        // the rest is anchored by the tick that first sees it
        sim.tick(2300);
        sim.tick(3799);
        assert_eq!(state(&sim), StateKind::LongRest);
        sim.tick(3800);
        assert_eq!(state(&sim), StateKind::Idle);
        assert_eq!(sim.piece_at(Cell::new(4, 4)).unwrap().id(), pawn);
        assert!(sim.piece_at(Cell::new(6, 4)).is_none());
        match moves.try_recv().unwrap() {
            GameEvent::MoveCommitted {
                piece,
                side,
                source,
                destination,
                ..
            } => {
                assert_eq!(piece, pawn);
                assert_eq!(side, Side::White);
                assert_eq!((source.as_str(), destination.as_str()), ("e2", "e4"));
            }
            event => panic!("unexpected {event:?}"),
        }
    }
    #[test]
    fn test_queued_commands_apply_in_order() {
        let mut sim = Simulation::standard().unwrap();
        let sender = sim.command_sender();
        let pawn = id_at(&sim, (6, 4));
        assert!(sender.send(order(&sim, StateKind::Move, "e2", "e4", 0)));
        // the piece is already moving when the second command is evaluated
        assert!(sender.send(order(&sim, StateKind::Move, "e2", "e3", 0)));
        sim.tick(0);
        let piece = find(&sim, pawn).unwrap();
        assert_eq!(piece.state_kind(), StateKind::Move);
        assert_eq!(piece.cell(), Cell::new(4, 4));
        assert_eq!(piece.history().len(), 2);
    }
    #[test]
    fn test_json_commands() {
        let mut sim = Simulation::standard().unwrap();
        let sender = sim.command_sender();
        let knight = id_at(&sim, (7, 6));
        let json = format!(
            r#"{{"timestamp_ms": 0, "piece_id": "{knight}", "kind": "JUMP", "params": ["g1", [5, 5]]}}"#
        );
        sender.send_json(&json).unwrap();
        assert!(sender.send_json("{not json").is_err());
        sim.tick(0);
        assert_eq!(find(&sim, knight).unwrap().state_kind(), StateKind::Jump);
        assert_eq!(find(&sim, knight).unwrap().cell(), Cell::new(5, 5));
    }
    #[test]
    fn test_blocked_path_is_rejected() {
        let mut sim = Simulation::standard().unwrap();
        let events = sim.events_mut().subscribe_all();
        let rook = id_at(&sim, (7, 0));
        let err = sim
            .apply_command(order(&sim, StateKind::Move, "a1", "a4", 0), 0)
            .unwrap_err();
        assert!(matches!(err, CommandError::PathBlocked(cell) if cell == Cell::new(6, 0)));
        let piece = find(&sim, rook).unwrap();
        assert_eq!(piece.state_kind(), StateKind::Idle);
        assert_eq!(piece.history().len(), 1);
        assert!(events.try_recv().is_err());
    }
    #[test]
    fn test_knight_ignores_path() {
        let mut sim = Simulation::standard().unwrap();
        sim.apply_command(order(&sim, StateKind::Move, "b1", "c3", 0), 0)
            .unwrap();
    }
    #[test]
    fn test_rejections() {
        let mut sim = Simulation::standard().unwrap();
        let rook = id_at(&sim, (7, 0));
        let err = sim.apply_command(Command::new(0, rook, StateKind::Move, "a3", "a4"), 0);
        assert!(matches!(err, Err(CommandError::EmptySource(_))));
        let err = sim.apply_command(Command::new(0, rook, StateKind::Move, "b1", "c3"), 0);
        assert!(matches!(err, Err(CommandError::UnknownPiece { named, .. }) if named == rook));
        let err = sim.apply_command(order(&sim, StateKind::Jump, "a1", "a2", 0), 0);
        assert!(matches!(err, Err(CommandError::FriendlyOccupant(_))));
        let err = sim.apply_command(order(&sim, StateKind::Move, "a1", "z9", 0), 0);
        assert!(matches!(err, Err(CommandError::Malformed(_))));
        let err = sim.apply_command(order(&sim, StateKind::LongRest, "a1", "a1", 0), 0);
        assert!(matches!(err, Err(CommandError::IllegalTransition { .. })));
        let err = sim.apply_command(order(&sim, StateKind::Move, "e2", "d3", 0), 0);
        assert!(matches!(err, Err(CommandError::IllegalMove { .. })));
    }
    #[test]
    fn test_commands_cannot_cut_timed_states_short() {
        let mut sim = simulation(&[
            (Material::WK, (7, 7)),
            (Material::BK, (0, 7)),
            (Material::WR, (7, 0)),
        ]);
        let rook = id_at(&sim, (7, 0));
        let state = |sim: &Simulation| find(sim, rook).unwrap().state_kind();
        sim.apply_command(order(&sim, StateKind::Move, "a1", "a5", 0), 0)
            .unwrap();
        sim.tick(0);
        sim.tick(1000);
        assert_eq!(id_at(&sim, (6, 0)), rook);

        let err = sim.apply_command(Command::new(1000, rook, StateKind::LongRest, "a2", "a2"), 1000);
        assert!(matches!(
            err,
            Err(CommandError::IllegalTransition {
                from: StateKind::Move,
                to: StateKind::LongRest
            })
        ));
        let err = sim.apply_command(Command::new(1000, rook, StateKind::Idle, "a2", "a2"), 1000);
        assert!(matches!(err, Err(CommandError::IllegalTransition { .. })));
        assert_eq!(state(&sim), StateKind::Move);
        assert_eq!(find(&sim, rook).unwrap().cell(), Cell::new(3, 0));

        sim.tick(4300);
        sim.tick(4300);
        assert_eq!(state(&sim), StateKind::LongRest);
        let err = sim.apply_command(Command::new(4400, rook, StateKind::Idle, "a5", "a5"), 4400);
        assert!(matches!(err, Err(CommandError::IllegalTransition { .. })));
        sim.tick(5799);
        assert_eq!(state(&sim), StateKind::LongRest);
        sim.tick(5800);
        assert_eq!(state(&sim), StateKind::Idle);
    }
    #[test]
    fn test_out_of_range_rank_is_dropped() {
        let mut sim = simulation(&[
            (Material::WK, (7, 7)),
            (Material::BK, (0, 7)),
            (Material::WR, (7, 0)),
        ]);
        let rook = id_at(&sim, (7, 0));
        let sender = sim.command_sender();
        let json = format!(
            r#"{{"timestamp_ms": 0, "piece_id": "{rook}", "kind": "MOVE", "params": ["a1", "a-2147483648"]}}"#
        );
        sender.send_json(&json).unwrap();
        sim.tick(0);
        assert_eq!(find(&sim, rook).unwrap().state_kind(), StateKind::Idle);
        let err = sim.apply_command(Command::new(0, rook, StateKind::Move, "a1", "a0"), 0);
        assert!(matches!(err, Err(CommandError::Malformed(_))));
    }
    #[test]
    fn test_pawn_diagonal_capture() {
        let mut sim = simulation(&[
            (Material::WK, (7, 7)),
            (Material::BK, (0, 0)),
            (Material::WP, (6, 4)),
            (Material::BN, (5, 3)),
        ]);
        let pawn = id_at(&sim, (6, 4));
        let knight = id_at(&sim, (5, 3));
        sim.apply_command(order(&sim, StateKind::Move, "e2", "d3", 0), 0)
            .unwrap();
        for now in (0..=1500).step_by(100) {
            sim.tick(now);
        }
        assert!(find(&sim, knight).is_none());
        assert_eq!(id_at(&sim, (5, 3)), pawn);
    }
    #[test]
    fn test_pawn_push_needs_empty_cell() {
        let mut sim = simulation(&[
            (Material::WK, (7, 7)),
            (Material::BK, (0, 0)),
            (Material::WP, (6, 4)),
            (Material::BP, (5, 4)),
        ]);
        let err = sim.apply_command(order(&sim, StateKind::Move, "e2", "e3", 0), 0);
        assert!(matches!(err, Err(CommandError::IllegalMove { .. })));
        let err = sim.apply_command(order(&sim, StateKind::Move, "e2", "e4", 0), 0);
        assert!(matches!(err, Err(CommandError::PathBlocked(cell)) if cell == Cell::new(5, 4)));
        let pawn = sim.piece_at(Cell::new(6, 4)).unwrap();
        assert_eq!(pawn.state_kind(), StateKind::Idle);
        assert_eq!(pawn.history().len(), 1);
    }
    #[test]
    fn test_jump_in_place() {
        let mut sim = Simulation::standard().unwrap();
        let jumps = sim.subscribe(&[EventTopic::Jump]);
        sim.apply_command(order(&sim, StateKind::Jump, "d1", "d1", 0), 0)
            .unwrap();
        assert_eq!(jumps.try_iter().count(), 1);
    }
    #[test]
    fn test_capture_and_score() {
        let mut sim = simulation(&[
            (Material::WK, (7, 4)),
            (Material::BK, (0, 4)),
            (Material::WR, (7, 0)),
            (Material::BN, (3, 0)),
        ]);
        let captures = sim.subscribe(&crate::game::Score::TOPICS);
        let rook = id_at(&sim, (7, 0));
        let knight = id_at(&sim, (3, 0));
        sim.apply_command(order(&sim, StateKind::Move, "a1", "a5", 0), 0)
            .unwrap();
        for now in (0..=4000).step_by(100) {
            sim.tick(now);
        }
        assert!(find(&sim, knight).is_none());
        assert_eq!(id_at(&sim, (3, 0)), rook);
        let mut score = crate::game::Score::new();
        for event in captures.try_iter() {
            score.record(&event);
        }
        assert_eq!(score.points(Side::White), 3);
        assert_eq!(sim.status(), MatchStatus::Running);
    }
    #[test]
    fn test_earlier_mover_keeps_cell() {
        let board = Board::default();
        let mut catalog = PieceCatalog::standard(&board);
        let offsets = catalog.get(Material::BR).unwrap().offsets.clone();
        let physics = PhysicsParams {
            speed_m_per_sec: 5.0,
            ..PhysicsParams::default()
        };
        catalog
            .insert(Material::BR, PieceConfig { offsets, physics })
            .unwrap();
        let factory = PieceFactory::new(board, &catalog).unwrap();
        let placement = Placement::new(vec![
            (Material::WK, Cell::new(7, 7)),
            (Material::BK, Cell::new(0, 7)),
            (Material::WR, Cell::new(5, 3)),
            (Material::BR, Cell::new(1, 3)),
        ]);
        let mut sim = Simulation::new(factory, &placement).unwrap();
        let captures = sim.subscribe(&[EventTopic::Capture]);
        let a = id_at(&sim, (5, 3));
        let b = id_at(&sim, (1, 3));

        let sender = sim.command_sender();
        sender.send(order(&sim, StateKind::Move, "d3", "d5", 1000));
        sim.tick(1000);
        sim.tick(1000);
        assert_eq!(find(&sim, a).unwrap().start_time(), Some(1000));
        assert_eq!(find(&sim, a).unwrap().physics().duration_ms(), 2000);

        for now in (1100..1500).step_by(100) {
            sim.tick(now);
        }
        sender.send(order(&sim, StateKind::Move, "d7", "d5", 1500));
        sim.tick(1500);
        sim.tick(1500);
        assert_eq!(find(&sim, b).unwrap().physics().duration_ms(), 400);

        for now in (1600..=4000).step_by(100) {
            sim.tick(now);
        }
        assert!(find(&sim, b).is_none());
        assert_eq!(id_at(&sim, (3, 3)), a);
        assert_eq!(
            captures.try_iter().collect::<Vec<_>>(),
            vec![GameEvent::Capture {
                capturing_piece: a,
                captured_piece: b,
                cell: Cell::new(3, 3)
            }]
        );
    }
    #[test]
    fn test_promotion_event() {
        let mut sim = simulation(&[
            (Material::WK, (7, 4)),
            (Material::BK, (0, 7)),
            (Material::WP, (1, 0)),
        ]);
        let promotions = sim.subscribe(&[EventTopic::Promotion]);
        let pawn = id_at(&sim, (1, 0));
        sim.apply_command(order(&sim, StateKind::Move, "a7", "a8", 0), 0)
            .unwrap();
        for now in (0..=1000).step_by(100) {
            sim.tick(now);
        }
        assert!(find(&sim, pawn).is_none());
        let queen = sim.piece_at(Cell::new(0, 0)).unwrap();
        assert_eq!(queen.kind(), PieceKind::Queen);
        assert_eq!(queen.side(), Side::White);
        match promotions.try_recv().unwrap() {
            GameEvent::Promotion { old_id, new_id, cell } => {
                assert_eq!(old_id, pawn);
                assert_eq!(new_id, queen.id());
                assert_eq!(cell, Cell::new(0, 0));
            }
            event => panic!("unexpected {event:?}"),
        }
    }
    #[test]
    fn test_bare_kings_terminate_once() {
        let mut sim = simulation(&[(Material::WK, (7, 4)), (Material::BK, (0, 4))]);
        let victories = sim.subscribe(&[EventTopic::Victory]);
        assert_eq!(sim.status(), MatchStatus::Running);
        sim.tick(0);
        assert_eq!(sim.status(), MatchStatus::Terminated { winner: None });
        sim.tick(10);
        sim.tick(20);
        assert_eq!(
            victories.try_iter().collect::<Vec<_>>(),
            vec![GameEvent::Victory { winning_side: None }]
        );
        let err = sim.apply_command(order(&sim, StateKind::Move, "e1", "e2", 30), 30);
        assert!(matches!(err, Err(CommandError::Terminated)));
    }
    #[test]
    fn test_king_capture_wins() {
        let mut sim = simulation(&[
            (Material::WK, (7, 4)),
            (Material::BK, (0, 4)),
            (Material::WQ, (2, 4)),
        ]);
        let victories = sim.subscribe(&[EventTopic::Victory]);
        sim.apply_command(order(&sim, StateKind::Move, "e6", "e8", 0), 0)
            .unwrap();
        for now in (0..=3000).step_by(100) {
            sim.tick(now);
        }
        assert_eq!(
            sim.status(),
            MatchStatus::Terminated {
                winner: Some(Side::White)
            }
        );
        assert_eq!(victories.try_iter().count(), 1);
        assert_eq!(sim.run(DEFAULT_TICK), Some(Side::White));
    }
    #[test]
    fn test_snapshot() {
        let mut sim = simulation(&[
            (Material::WK, (7, 4)),
            (Material::BK, (0, 4)),
            (Material::WN, (7, 1)),
        ]);
        let knight = id_at(&sim, (7, 1));
        sim.apply_command(order(&sim, StateKind::Jump, "b1", "c3", 0), 0)
            .unwrap();
        sim.tick(250);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.pieces.len(), 3);
        let entry = &snapshot.pieces[&knight];
        assert_eq!(entry.kind, PieceKind::Knight);
        assert_eq!(entry.cell, Cell::new(5, 2));
        assert_eq!(entry.state_kind, StateKind::Jump);
        assert_eq!(entry.state_started_at, Some(250));
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"NW_1\""));
        assert_eq!(BoardSnapshot::from_json(&json).unwrap(), snapshot);
    }
}
