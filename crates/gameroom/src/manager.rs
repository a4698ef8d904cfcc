use qf_core::*;
use std::collections::HashSet;

/// Room mode: seat capacity and end-of-game threshold differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    Single,
    Multi,
}

impl GameType {
    pub fn capacity(self) -> usize {
        match self {
            GameType::Single => SINGLE_CAPACITY,
            GameType::Multi => MULTI_CAPACITY,
        }
    }
    /// Ready members required before a countdown can begin.
    pub fn min_players(self) -> usize {
        match self {
            GameType::Single => 1,
            GameType::Multi => MULTI_MIN_PLAYERS,
        }
    }
    /// The game ends once this many runs (or fewer) are still going.
    pub fn last_standing(self) -> usize {
        match self {
            GameType::Single => 0,
            GameType::Multi => 1,
        }
    }
}

/// Outcome of a ready signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyVerdict {
    /// Everyone required is ready: begin the countdown.
    CountdownStarted,
    /// A lone ready player in multiplayer gets a notice, not silence.
    NotEnoughPlayers,
    /// Still waiting on other members (or already counting/started).
    Pending,
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickVerdict {
    /// Broadcast this many seconds remaining.
    Announce(u32),
    /// Countdown complete: start the game.
    Start,
}

/// The room's lifecycle state machine: waiting, countdown, running,
/// ended. Pure bookkeeping; the room does the broadcasting.
pub struct RoomManager {
    game_type: GameType,
    game_started: bool,
    ended: bool,
    countdown: Option<u32>,
    next_ranking: usize,
    terminated: HashSet<PlayerId>,
}

impl RoomManager {
    pub fn new(game_type: GameType) -> Self {
        Self {
            game_type,
            game_started: false,
            ended: false,
            countdown: None,
            next_ranking: 0,
            terminated: HashSet::new(),
        }
    }
    pub fn game_type(&self) -> GameType {
        self.game_type
    }
    pub fn game_started(&self) -> bool {
        self.game_started
    }
    pub fn ended(&self) -> bool {
        self.ended
    }
    pub fn in_countdown(&self) -> bool {
        self.countdown.is_some()
    }
    pub fn next_ranking(&self) -> usize {
        self.next_ranking
    }

    /// Evaluates the ready-check after a PLAY signal.
    pub fn ready_check(&mut self, ready: usize, members: usize) -> ReadyVerdict {
        if self.game_started || self.in_countdown() {
            return ReadyVerdict::Pending;
        }
        if members < self.game_type.min_players() {
            return ReadyVerdict::NotEnoughPlayers;
        }
        if ready == members {
            self.countdown = Some(COUNTDOWN_TICKS);
            ReadyVerdict::CountdownStarted
        } else {
            ReadyVerdict::Pending
        }
    }

    /// Advances the countdown by one delivered tick.
    pub fn tick(&mut self) -> TickVerdict {
        let remaining = self.countdown.expect("tick outside countdown");
        if remaining > 0 {
            self.countdown = Some(remaining - 1);
            TickVerdict::Announce(remaining)
        } else {
            self.countdown = None;
            TickVerdict::Start
        }
    }

    /// Marks the game started with this many seated members.
    pub fn start(&mut self, members: usize) {
        assert!(!self.game_started, "game started twice");
        self.game_started = true;
        self.next_ranking = members;
    }

    /// Records one player's terminal event and hands back their placing.
    /// Exactly one decrement per player; a repeat is a lifecycle bug.
    pub fn record_termination(&mut self, player: PlayerId) -> usize {
        assert!(
            self.terminated.insert(player),
            "P{} terminated twice",
            player
        );
        assert!(self.next_ranking > 0, "ranking underflow");
        let rank = self.next_ranking;
        self.next_ranking -= 1;
        rank
    }

    /// True when this many still-running members means the game is over.
    pub fn is_finished(&self, running: usize) -> bool {
        self.game_started && !self.ended && running <= self.game_type.last_standing()
    }

    /// Marks the room ended; the cancelled countdown case covers a room
    /// torn down between ready-check and start.
    pub fn end(&mut self) {
        self.ended = true;
        self.countdown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplayer_needs_two_members() {
        let mut manager = RoomManager::new(GameType::Multi);
        assert_eq!(manager.ready_check(1, 1), ReadyVerdict::NotEnoughPlayers);
        assert_eq!(manager.ready_check(1, 2), ReadyVerdict::Pending);
        assert_eq!(manager.ready_check(2, 2), ReadyVerdict::CountdownStarted);
    }

    #[test]
    fn single_player_starts_alone() {
        let mut manager = RoomManager::new(GameType::Single);
        assert_eq!(manager.ready_check(1, 1), ReadyVerdict::CountdownStarted);
    }

    #[test]
    fn ready_during_countdown_is_inert() {
        let mut manager = RoomManager::new(GameType::Multi);
        assert_eq!(manager.ready_check(2, 2), ReadyVerdict::CountdownStarted);
        assert_eq!(manager.ready_check(2, 2), ReadyVerdict::Pending);
    }

    #[test]
    fn countdown_announces_then_starts() {
        let mut manager = RoomManager::new(GameType::Multi);
        manager.ready_check(2, 2);
        assert_eq!(manager.tick(), TickVerdict::Announce(3));
        assert_eq!(manager.tick(), TickVerdict::Announce(2));
        assert_eq!(manager.tick(), TickVerdict::Announce(1));
        assert_eq!(manager.tick(), TickVerdict::Start);
        assert!(!manager.in_countdown());
    }

    #[test]
    fn ranking_counts_down_from_room_size() {
        let mut manager = RoomManager::new(GameType::Multi);
        manager.start(3);
        assert_eq!(manager.record_termination(5), 3);
        assert_eq!(manager.record_termination(6), 2);
        assert_eq!(manager.record_termination(7), 1);
        assert_eq!(manager.next_ranking(), 0);
    }

    #[test]
    #[should_panic(expected = "terminated twice")]
    fn double_termination_asserts() {
        let mut manager = RoomManager::new(GameType::Multi);
        manager.start(2);
        manager.record_termination(1);
        manager.record_termination(1);
    }

    #[test]
    fn finish_thresholds_differ_by_mode() {
        let mut multi = RoomManager::new(GameType::Multi);
        multi.start(3);
        assert!(!multi.is_finished(2));
        assert!(multi.is_finished(1));
        let mut single = RoomManager::new(GameType::Single);
        single.start(1);
        assert!(!single.is_finished(1));
        assert!(single.is_finished(0));
    }
}
