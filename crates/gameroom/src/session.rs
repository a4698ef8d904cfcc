use super::*;
use qf_core::*;
use tokio::sync::mpsc::UnboundedSender;

/// Marker for transport connection identities.
pub struct Conn;

/// One seated player: connection identity, room flags, the outbox the
/// bus delivers into, and this player's game run.
///
/// A session is destroyed on leave; the room tears down its bus bindings
/// in the same step so nothing dangles.
pub struct PlayerSession {
    id: PlayerId,
    conn: ID<Conn>,
    is_host: bool,
    ready: bool,
    outbox: UnboundedSender<Event>,
    run: GameRun,
}

impl PlayerSession {
    pub fn new(id: PlayerId, conn: ID<Conn>, is_host: bool, outbox: UnboundedSender<Event>) -> Self {
        Self {
            id,
            conn,
            is_host,
            ready: false,
            outbox,
            run: GameRun::new(),
        }
    }
    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub fn conn(&self) -> ID<Conn> {
        self.conn
    }
    pub fn is_host(&self) -> bool {
        self.is_host
    }
    pub fn ready(&self) -> bool {
        self.ready
    }
    pub fn set_ready(&mut self) {
        self.ready = true;
    }
    pub fn outbox(&self) -> &UnboundedSender<Event> {
        &self.outbox
    }
    pub fn run(&self) -> &GameRun {
        &self.run
    }
    pub fn run_mut(&mut self) -> &mut GameRun {
        &mut self.run
    }
}
