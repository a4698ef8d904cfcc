use super::*;
use qf_core::*;
use qf_playfield::Board;
use qf_playfield::PieceBag;
use qf_playfield::PowerUpKind;
use qf_playfield::Spin;
use qf_playfield::StepReport;
use std::collections::VecDeque;

/// Lifecycle of one player's run. Terminal is terminal: a run never
/// restarts inside the same room game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    Running,
    Terminated,
}

/// Side effects of a replayed batch that the room must act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Lines were cleared by one lock (1..=4).
    Cleared(u32),
    /// The piece sequence is nearly exhausted; request a shared set.
    BagLow,
    /// A held power-up was played toward the opponent this many seats
    /// clockwise.
    PowerUp { kind: PowerUpKind, seat_offset: usize },
    /// The run just reached its terminal state.
    ToppedOut,
}

/// One player's authoritative game: score, level, and line bookkeeping
/// over an owned board, plus the power-up inventory.
pub struct GameRun {
    score: Points,
    level: Level,
    lines: u32,
    lines_remaining: i32,
    status: GameStatus,
    power_ups: VecDeque<PowerUpKind>,
    board: Option<Board>,
}

impl Default for GameRun {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRun {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            lines_remaining: LINES_PER_LEVEL as i32,
            status: GameStatus::NotStarted,
            power_ups: VecDeque::new(),
            board: None,
        }
    }
    pub fn status(&self) -> GameStatus {
        self.status
    }
    pub fn score(&self) -> Points {
        self.score
    }
    pub fn level(&self) -> Level {
        self.level
    }
    pub fn lines(&self) -> u32 {
        self.lines
    }
    pub fn power_ups(&self) -> impl Iterator<Item = PowerUpKind> + '_ {
        self.power_ups.iter().copied()
    }
    /// Settled-cell snapshot; empty before the first start.
    pub fn grid(&self) -> Grid {
        self.board.as_ref().map_or(EMPTY_GRID, |b| *b.grid())
    }
    pub fn board_mut(&mut self) -> Option<&mut Board> {
        self.board.as_mut()
    }

    /// Brings the run live over a seeded bag. Asserts on restart: a room
    /// game starts each member exactly once.
    pub fn start(&mut self, bag: PieceBag) {
        assert_eq!(self.status, GameStatus::NotStarted, "run already started");
        self.board = Some(Board::new(bag));
        self.status = GameStatus::Running;
    }
    /// Forces the terminal state, for room end or a mid-game leave.
    /// Asserts against double termination; one ranking decrement each.
    pub fn terminate(&mut self) {
        assert_ne!(self.status, GameStatus::Terminated, "run already terminal");
        self.status = GameStatus::Terminated;
    }
    /// Appends a shared set to this run's piece sequence.
    pub fn add_pieces(&mut self, set: Vec<qf_playfield::PieceKind>) {
        if let Some(board) = self.board.as_mut() {
            board.push_set(set);
        }
    }
    /// Accepts an offered power-up unless the inventory is full.
    pub fn offer_power_up(&mut self, kind: PowerUpKind) -> bool {
        if self.power_ups.len() < POWER_UP_CAP {
            self.power_ups.push_back(kind);
            true
        } else {
            log::debug!("[run] inventory full, dropping {}", kind);
            false
        }
    }

    /// Replays one flushed command batch strictly in order.
    ///
    /// Commands outside the running state are silent no-ops. The caller
    /// gets back every side effect the room must fan out; the board
    /// snapshot itself is read separately so exactly one state sync goes
    /// out per batch.
    pub fn execute(&mut self, commands: &[Command], opponents: usize) -> Vec<RunEvent> {
        let mut events = Vec::new();
        if self.status != GameStatus::Running {
            return events;
        }
        for command in commands {
            if self.status != GameStatus::Running {
                break;
            }
            let report = self.dispatch(*command, opponents, &mut events);
            self.settle(report, &mut events);
        }
        if self.board.as_ref().is_some_and(Board::bag_almost_empty) {
            events.push(RunEvent::BagLow);
        }
        events
    }

    fn dispatch(
        &mut self,
        command: Command,
        opponents: usize,
        events: &mut Vec<RunEvent>,
    ) -> StepReport {
        let board = self.board.as_mut().expect("running without a board");
        match command {
            Command::Left => board.shift(-1, 0, 0),
            Command::Right => board.shift(1, 0, 0),
            Command::Down => board.shift(0, 1, SCORE_SOFT_DROP),
            Command::AutoDown => board.shift(0, 1, SCORE_GRAVITY),
            Command::RotateLeft => {
                board.rotate(Spin::Left);
                StepReport::default()
            }
            Command::RotateRight => {
                board.rotate(Spin::Right);
                StepReport::default()
            }
            Command::HardDrop => board.hard_drop(),
            Command::PowerUp(seat_offset) => {
                // Seat offsets past the table and empty inventories are
                // steady-state conditions, never faults.
                if seat_offset <= opponents && !self.power_ups.is_empty() {
                    let kind = self.power_ups.pop_front().expect("non-empty inventory");
                    events.push(RunEvent::PowerUp { kind, seat_offset });
                }
                StepReport::default()
            }
        }
    }

    /// Applies a step's score and line effects to the bookkeeping.
    fn settle(&mut self, report: StepReport, events: &mut Vec<RunEvent>) {
        self.score += report.points;
        if report.cleared > 0 {
            self.score += LINE_SCORES[report.cleared as usize - 1] * self.level;
            self.lines += report.cleared;
            self.lines_remaining -= report.cleared as i32;
            while self.lines_remaining <= 0 {
                self.level += 1;
                self.lines_remaining += LINES_PER_LEVEL as i32;
            }
            events.push(RunEvent::Cleared(report.cleared));
        }
        if report.topped_out {
            self.status = GameStatus::Terminated;
            events.push(RunEvent::ToppedOut);
        }
    }
}
