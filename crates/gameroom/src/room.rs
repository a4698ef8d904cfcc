use super::*;
use qf_core::*;
use qf_playfield::PieceBag;
use qf_playfield::PowerUpKind;
use qf_playfield::fresh_set;
use qf_playfield::powerup;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashMap;

/// Whether a room still has members after a leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomVitality {
    Occupied,
    Empty,
}

/// Live game room coordinator.
///
/// Imperative shell that owns the members' sessions (each wrapping a
/// deterministic run), the typed bus their outboxes hang off, and the
/// lifecycle manager. Every mutation happens on the owning task, so
/// rooms are isolated object graphs with no cross-room state.
pub struct GameRoom {
    id: ID<Self>,
    bus: EventBus,
    players: Vec<PlayerSession>,
    subscriptions: HashMap<PlayerId, Vec<Subscription>>,
    next_player_id: PlayerId,
    manager: RoomManager,
    rng: SmallRng,
}

impl GameRoom {
    pub fn new(id: ID<Self>, game_type: GameType) -> Self {
        Self::with_rng(id, game_type, SmallRng::from_os_rng())
    }
    /// Deterministic construction for tests and replays.
    pub fn with_rng(id: ID<Self>, game_type: GameType, rng: SmallRng) -> Self {
        Self {
            id,
            bus: EventBus::new(),
            players: Vec::new(),
            subscriptions: HashMap::new(),
            next_player_id: 1,
            manager: RoomManager::new(game_type),
            rng,
        }
    }
    pub fn manager(&self) -> &RoomManager {
        &self.manager
    }
    pub fn session(&self, player: PlayerId) -> Option<&PlayerSession> {
        self.players.iter().find(|p| p.id() == player)
    }
    pub fn members(&self) -> Vec<PlayerId> {
        self.players.iter().map(PlayerSession::id).collect()
    }
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
    fn position(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id() == player)
    }

    fn send_all(&self, event: Event) {
        let members = self.members();
        Fanout::new(&self.bus, &members).send_all(event);
    }
    fn send_to(&self, player: PlayerId, event: Event) {
        let members = self.members();
        Fanout::new(&self.bus, &members).send_to(player, event);
    }
    fn notice(text: &str) -> Event {
        Event::GameMessage {
            header: "notice".into(),
            body: vec![text.into()],
        }
    }

    /// Seats a new player unless the room is full, already playing, or
    /// the connection is already seated. Rejections are flash notices to
    /// the requester, never faults, and leave membership untouched.
    pub fn join(
        &mut self,
        conn: ID<Conn>,
        outbox: tokio::sync::mpsc::UnboundedSender<Event>,
    ) -> Option<PlayerId> {
        let rejection = if self.manager.game_started() {
            Some("Game already in progress")
        } else if self.players.len() >= self.manager.game_type().capacity() {
            Some("Room is full")
        } else if self.players.iter().any(|p| p.conn() == conn) {
            Some("Already in this room")
        } else {
            None
        };
        if let Some(reason) = rejection {
            log::info!("[room {}] join rejected: {}", self.id, reason);
            let _ = outbox.send(Self::notice(reason));
            return None;
        }
        let id = self.next_player_id;
        self.next_player_id += 1;
        let handles = Topic::ALL
            .into_iter()
            .map(|topic| self.bus.subscribe(id, topic, outbox.clone()))
            .collect();
        self.subscriptions.insert(id, handles);
        self.players
            .push(PlayerSession::new(id, conn, self.players.is_empty(), outbox));
        log::info!("[room {}] P{} joined", self.id, id);
        // Announce the joiner to everyone, then the roster to the joiner.
        self.send_all(Event::AddPlayer(id));
        for other in self.members().into_iter().filter(|&m| m != id) {
            self.send_to(id, Event::AddPlayer(other));
        }
        Some(id)
    }

    /// Removes a member and exactly their bus bindings. Safe to call for
    /// a player who already left; teardown is idempotent at this level.
    pub fn leave(&mut self, player: PlayerId) -> RoomVitality {
        let Some(position) = self.position(player) else {
            log::debug!("[room {}] leave for absent P{}", self.id, player);
            return if self.is_empty() {
                RoomVitality::Empty
            } else {
                RoomVitality::Occupied
            };
        };
        let session = self.players.remove(position);
        let was_running = session.run().status() == GameStatus::Running;
        for handle in self.subscriptions.remove(&player).unwrap_or_default() {
            self.bus.unsubscribe(handle);
        }
        log::info!("[room {}] P{} left", self.id, player);
        if self.players.is_empty() {
            self.manager.end();
            return RoomVitality::Empty;
        }
        // A mid-game leaver's run terminates with them.
        if self.manager.game_started() && !self.manager.ended() && was_running {
            let _ = self.manager.record_termination(player);
        }
        self.send_all(Event::RemovePlayer(player));
        self.maybe_finish();
        RoomVitality::Occupied
    }

    /// Handles a PLAY signal: marks the member ready and evaluates the
    /// ready-check. The caller owns the clock, so a started countdown is
    /// reported rather than driven from here.
    pub fn ready(&mut self, player: PlayerId) -> ReadyVerdict {
        let Some(position) = self.position(player) else {
            return ReadyVerdict::Pending;
        };
        self.players[position].set_ready();
        let ready = self.players.iter().filter(|p| p.ready()).count();
        let verdict = self.manager.ready_check(ready, self.players.len());
        match verdict {
            ReadyVerdict::NotEnoughPlayers => {
                self.send_to(player, Self::notice("Waiting for more players"));
            }
            ReadyVerdict::CountdownStarted => {
                log::info!("[room {}] countdown started", self.id);
            }
            ReadyVerdict::Pending => {}
        }
        verdict
    }

    /// Consumes one countdown tick: an announcement, or the start.
    pub fn tick(&mut self) {
        match self.manager.tick() {
            TickVerdict::Announce(remaining) => {
                self.send_all(Event::GameMessage {
                    header: "countdown".into(),
                    body: vec![remaining.to_string()],
                });
            }
            TickVerdict::Start => self.start_game(),
        }
    }

    /// Starts every member's run over one shared set and broadcasts it,
    /// so all boards replay identical piece sequences.
    fn start_game(&mut self) {
        self.manager.start(self.players.len());
        let set = fresh_set(&mut self.rng);
        for session in self.players.iter_mut() {
            let mut bag = PieceBag::new();
            bag.push_set(set.clone());
            session.run_mut().start(bag);
        }
        log::info!(
            "[room {}] game started with {} players",
            self.id,
            self.players.len()
        );
        self.send_all(Event::AddPieces(set));
        self.send_all(Event::GameMessage {
            header: "start".into(),
            body: vec!["GO".into()],
        });
    }

    /// Replays one flushed command batch for a member and fans out the
    /// consequences. Exactly one grid sync goes out per batch; commands
    /// for absent members or non-running runs are silent no-ops.
    pub fn execute(&mut self, player: PlayerId, tokens: &[String]) {
        let commands = Protocol::commands(tokens);
        let opponents = self.players.len().saturating_sub(1);
        let Some(position) = self.position(player) else {
            return;
        };
        if self.players[position].run().status() != GameStatus::Running {
            return;
        }
        let events = self.players[position].run_mut().execute(&commands, opponents);
        let grid = self.players[position].run().grid();
        self.send_all(Event::UpdatePlayer { id: player, grid });
        for event in events {
            match event {
                RunEvent::Cleared(lines) => self.offer_power_up(player, lines),
                RunEvent::BagLow => self.distribute_set(),
                RunEvent::PowerUp { kind, seat_offset } => {
                    if let Some(target) = self.seat_at(player, seat_offset) {
                        self.apply_power_up(player, kind, target);
                    }
                }
                RunEvent::ToppedOut => self.record_game_over(player),
            }
        }
    }

    /// Direct power-up play from a USE_POWER_UP frame. The server stays
    /// authoritative: the oldest held power-up is consumed regardless of
    /// what the client claimed, and a bad target consumes nothing.
    pub fn use_power_up(&mut self, source: PlayerId, target: PlayerId) {
        let Some(position) = self.position(source) else {
            return;
        };
        if source == target || self.position(target).is_none() {
            return;
        }
        if self.players[position].run().status() != GameStatus::Running {
            return;
        }
        let offset = self.seat_offset(source, target);
        let opponents = self.players.len().saturating_sub(1);
        let events = self.players[position]
            .run_mut()
            .execute(&[Command::PowerUp(offset)], opponents);
        for event in events {
            if let RunEvent::PowerUp { kind, .. } = event {
                self.apply_power_up(source, kind, target);
            }
        }
    }

    /// The member this many seats clockwise of the given player.
    fn seat_at(&self, player: PlayerId, offset: usize) -> Option<PlayerId> {
        let position = self.position(player)?;
        let target = self.players[(position + offset) % self.players.len()].id();
        (target != player).then_some(target)
    }
    /// Clockwise distance between two seated members.
    fn seat_offset(&self, from: PlayerId, to: PlayerId) -> usize {
        let len = self.players.len();
        let from = self.position(from).expect("seated member");
        let to = self.position(to).expect("seated member");
        (to + len - from) % len
    }

    /// Rolls a power-up offer for a nonzero clear, multiplayer only.
    fn offer_power_up(&mut self, player: PlayerId, lines: u32) {
        debug_assert!(lines > 0);
        if self.manager.game_type() != GameType::Multi {
            return;
        }
        if !self.rng.random_bool(POWER_UP_CHANCE) {
            return;
        }
        let kind = PowerUpKind::random(&mut self.rng);
        let Some(position) = self.position(player) else {
            return;
        };
        if self.players[position].run_mut().offer_power_up(kind) {
            self.send_to(player, Event::AddPowerUp(kind));
        }
    }

    /// Applies a consumed power-up to the target's board and re-syncs
    /// every affected grid so mirrors converge.
    fn apply_power_up(&mut self, source: PlayerId, kind: PowerUpKind, target: PlayerId) {
        let (Some(si), Some(ti)) = (self.position(source), self.position(target)) else {
            return;
        };
        if self.players[ti].run().status() != GameStatus::Running {
            return;
        }
        let source_grid = self.players[si].run().grid();
        let target_grid = self.players[ti].run().grid();
        let (new_source, new_target) =
            powerup::apply(kind, source_grid, target_grid, &mut self.rng);
        log::info!("[room {}] P{} plays {} on P{}", self.id, source, kind, target);
        let mut affected = Vec::new();
        if new_source != source_grid {
            if let Some(board) = self.players[si].run_mut().board_mut() {
                board.replace_grid(new_source);
            }
            affected.push(source);
        }
        if new_target != target_grid {
            if let Some(board) = self.players[ti].run_mut().board_mut() {
                board.replace_grid(new_target);
            }
            affected.push(target);
        }
        self.send_all(Event::UsePowerUp {
            power_up: kind,
            source,
            target,
        });
        for id in affected {
            if let Some(position) = self.position(id) {
                let grid = self.players[position].run().grid();
                self.send_all(Event::UpdatePlayer { id, grid });
            }
        }
    }

    /// Generates one fresh set and feeds it to every member identically.
    fn distribute_set(&mut self) {
        let set = fresh_set(&mut self.rng);
        for session in self.players.iter_mut() {
            session.run_mut().add_pieces(set.clone());
        }
        self.send_all(Event::AddPieces(set));
    }

    /// Broadcasts a member's terminal state with their placing, then
    /// checks whether the room is done.
    fn record_game_over(&mut self, player: PlayerId) {
        let rank = self.manager.record_termination(player);
        let Some(position) = self.position(player) else {
            return;
        };
        let grid = self.players[position].run().grid();
        self.send_all(Event::GameOver {
            id: player,
            grid,
            message: Some(format!("Finished #{}", rank)),
        });
        self.maybe_finish();
    }

    /// Ends the room once running players fall to the mode's threshold:
    /// survivors are force-terminated (collecting the top placings) and
    /// the terminal message goes out to everyone.
    fn maybe_finish(&mut self) {
        let running = self
            .players
            .iter()
            .filter(|p| p.run().status() == GameStatus::Running)
            .count();
        if !self.manager.is_finished(running) {
            return;
        }
        self.manager.end();
        let survivors: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.run().status() == GameStatus::Running)
            .map(PlayerSession::id)
            .collect();
        let mut winner = None;
        for id in survivors {
            let rank = self.manager.record_termination(id);
            if rank == 1 {
                winner = Some(id);
            }
            let Some(position) = self.position(id) else {
                continue;
            };
            self.players[position].run_mut().terminate();
            let grid = self.players[position].run().grid();
            self.send_all(Event::GameOver {
                id,
                grid,
                message: Some(format!("Finished #{}", rank)),
            });
        }
        let body = match winner {
            Some(id) => vec![format!("Player {} wins", id)],
            None => vec!["Game over".into()],
        };
        log::info!("[room {}] game over: {:?}", self.id, body);
        self.send_all(Event::GameMessage {
            header: "game_over".into(),
            body,
        });
    }
}

impl Unique for GameRoom {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    fn room(game_type: GameType) -> GameRoom {
        GameRoom::with_rng(ID::default(), game_type, SmallRng::seed_from_u64(77))
    }

    fn join(room: &mut GameRoom) -> (PlayerId, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        let id = room.join(ID::default(), tx).expect("join accepted");
        (id, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Two joined, both ready, countdown run to completion.
    fn started_pair() -> (
        GameRoom,
        (PlayerId, UnboundedReceiver<Event>),
        (PlayerId, UnboundedReceiver<Event>),
    ) {
        let mut room = room(GameType::Multi);
        let a = join(&mut room);
        let b = join(&mut room);
        room.ready(a.0);
        assert_eq!(room.ready(b.0), ReadyVerdict::CountdownStarted);
        for _ in 0..=COUNTDOWN_TICKS {
            room.tick();
        }
        assert!(room.manager().game_started());
        (room, a, b)
    }

    /// Walls in the spawn area without completing any row, so the next
    /// lock tops the player out.
    fn choke(room: &mut GameRoom, player: PlayerId) {
        let position = room.position(player).unwrap();
        let board = room.players[position].run_mut().board_mut().unwrap();
        let mut grid = EMPTY_GRID;
        for row in 0..4 {
            for col in 0..BOARD_COLS - 1 {
                grid[row][col] = 9;
            }
        }
        board.set_grid(grid);
    }

    #[test]
    fn join_announces_membership_both_ways() {
        let mut room = room(GameType::Multi);
        let (p1, mut rx1) = join(&mut room);
        drain(&mut rx1);
        let (p2, mut rx2) = join(&mut room);
        let told = drain(&mut rx1);
        assert!(matches!(&told[..], [Event::AddPlayer(id)] if *id == p2));
        // The joiner hears about themselves, then the existing roster.
        let seen = drain(&mut rx2);
        assert!(matches!(seen[0], Event::AddPlayer(id) if id == p2));
        assert!(matches!(seen[1], Event::AddPlayer(id) if id == p1));
    }

    #[test]
    fn full_room_rejects_with_exactly_one_notice() {
        let mut room = room(GameType::Single);
        let _seated = join(&mut room);
        let (tx, mut rx) = unbounded_channel();
        assert!(room.join(ID::default(), tx).is_none());
        let seen = drain(&mut rx);
        assert_eq!(seen.len(), 1);
        assert!(matches!(seen[0], Event::GameMessage { .. }));
        assert_eq!(room.members().len(), 1);
    }

    #[test]
    fn duplicate_connection_is_rejected() {
        let mut room = room(GameType::Multi);
        let conn = ID::default();
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        assert!(room.join(conn, tx1).is_some());
        assert!(room.join(conn, tx2).is_none());
        assert_eq!(drain(&mut rx2).len(), 1);
        assert_eq!(room.members().len(), 1);
    }

    #[test]
    fn started_room_rejects_joins() {
        let (mut room, _a, _b) = started_pair();
        let (tx, mut rx) = unbounded_channel();
        assert!(room.join(ID::default(), tx).is_none());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn lone_ready_in_multiplayer_gets_a_notice() {
        let mut room = room(GameType::Multi);
        let (p1, mut rx1) = join(&mut room);
        drain(&mut rx1);
        assert_eq!(room.ready(p1), ReadyVerdict::NotEnoughPlayers);
        let seen = drain(&mut rx1);
        assert!(matches!(&seen[..], [Event::GameMessage { .. }]));
        assert!(!room.manager().in_countdown());
    }

    #[test]
    fn countdown_announces_each_tick_then_starts() {
        let mut room = room(GameType::Multi);
        let (p1, mut rx1) = join(&mut room);
        let (p2, _rx2) = join(&mut room);
        room.ready(p1);
        room.ready(p2);
        drain(&mut rx1);
        for expected in ["3", "2", "1"] {
            room.tick();
            let seen = drain(&mut rx1);
            assert!(
                matches!(&seen[..], [Event::GameMessage { header, body }]
                    if header == "countdown" && body[0] == expected)
            );
        }
        room.tick();
        let seen = drain(&mut rx1);
        assert!(matches!(seen[0], Event::AddPieces(ref set) if set.len() == BAG_SET_LEN));
        assert!(matches!(&seen[1], Event::GameMessage { header, .. } if header == "start"));
        assert_eq!(
            room.session(p1).unwrap().run().status(),
            GameStatus::Running
        );
    }

    #[test]
    fn identical_batches_leave_identical_boards() {
        let (mut room, (p1, mut rx1), (p2, _rx2)) = started_pair();
        let tokens: Vec<String> = ["LEFT", "ROTATE_RIGHT", "DOWN", "HARD_DROP"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        drain(&mut rx1);
        room.execute(p1, &tokens);
        room.execute(p2, &tokens);
        let a = room.session(p1).unwrap().run();
        let b = room.session(p2).unwrap().run();
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.score(), b.score());
        // Each batch produced exactly one state sync per player.
        let syncs = drain(&mut rx1)
            .into_iter()
            .filter(|e| matches!(e, Event::UpdatePlayer { .. }))
            .count();
        assert_eq!(syncs, 2);
    }

    #[test]
    fn top_out_ranks_players_and_ends_the_room() {
        let (mut room, (p1, mut rx1), (p2, _rx2)) = started_pair();
        choke(&mut room, p1);
        drain(&mut rx1);
        room.execute(p1, &["HARD_DROP".to_string()]);
        let seen = drain(&mut rx1);
        let overs: Vec<(PlayerId, Option<String>)> = seen
            .iter()
            .filter_map(|e| match e {
                Event::GameOver { id, message, .. } => Some((*id, message.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(overs.len(), 2);
        assert_eq!(overs[0], (p1, Some("Finished #2".into())));
        assert_eq!(overs[1], (p2, Some("Finished #1".into())));
        assert!(
            seen.iter().any(|e| matches!(e, Event::GameMessage { header, body }
                if header == "game_over" && body[0] == format!("Player {} wins", p2)))
        );
        assert!(room.manager().ended());
        assert_eq!(room.manager().next_ranking(), 0);
    }

    #[test]
    fn leave_tears_down_exactly_that_players_bindings() {
        let mut room = room(GameType::Multi);
        let (p1, _rx1) = join(&mut room);
        let (p2, _rx2) = join(&mut room);
        assert_eq!(room.bus.bindings(), 2 * Topic::ALL.len());
        assert_eq!(room.leave(p1), RoomVitality::Occupied);
        assert_eq!(room.bus.bindings(), Topic::ALL.len());
        // Idempotent at this level: a second leave is a quiet no-op.
        assert_eq!(room.leave(p1), RoomVitality::Occupied);
        assert_eq!(room.leave(p2), RoomVitality::Empty);
        assert_eq!(room.bus.bindings(), 0);
    }

    #[test]
    fn mid_game_leave_counts_as_termination() {
        let (mut room, (p1, _rx1), (p2, mut rx2)) = started_pair();
        drain(&mut rx2);
        room.leave(p1);
        let seen = drain(&mut rx2);
        assert!(seen.iter().any(|e| matches!(e, Event::RemovePlayer(id) if *id == p1)));
        // The survivor wins and the room ends.
        assert!(room.manager().ended());
        assert_eq!(
            room.session(p2).unwrap().run().status(),
            GameStatus::Terminated
        );
    }

    #[test]
    fn direct_power_up_swaps_boards_and_resyncs() {
        let (mut room, (p1, mut rx1), (p2, _rx2)) = started_pair();
        let mut low = EMPTY_GRID;
        low[19][0] = 1;
        let mut high = EMPTY_GRID;
        high[19] = [2; BOARD_COLS];
        high[18] = [2; BOARD_COLS];
        let i1 = room.position(p1).unwrap();
        room.players[i1].run_mut().board_mut().unwrap().set_grid(low);
        let i2 = room.position(p2).unwrap();
        room.players[i2].run_mut().board_mut().unwrap().set_grid(high);
        room.players[i1]
            .run_mut()
            .offer_power_up(PowerUpKind::SwapBoards);
        drain(&mut rx1);
        room.use_power_up(p1, p2);
        assert_eq!(room.session(p1).unwrap().run().grid(), high);
        assert_eq!(room.session(p2).unwrap().run().grid(), low);
        let seen = drain(&mut rx1);
        assert!(seen.iter().any(|e| matches!(e, Event::UsePowerUp { .. })));
        let syncs = seen
            .iter()
            .filter(|e| matches!(e, Event::UpdatePlayer { .. }))
            .count();
        assert_eq!(syncs, 2);
    }

    #[test]
    fn power_up_against_a_stranger_is_a_no_op() {
        let (mut room, (p1, mut rx1), _b) = started_pair();
        let i1 = room.position(p1).unwrap();
        room.players[i1]
            .run_mut()
            .offer_power_up(PowerUpKind::ClearBoard);
        drain(&mut rx1);
        room.use_power_up(p1, 999);
        assert!(drain(&mut rx1).is_empty());
        assert_eq!(room.session(p1).unwrap().run().power_ups().count(), 1);
    }
}
