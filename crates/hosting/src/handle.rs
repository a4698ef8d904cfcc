use qf_core::*;
use qf_gameroom::Conn;
use qf_gameroom::Event;
use qf_gameroom::GameRoom;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Inbound traffic for one room's actor, in arrival order.
#[derive(Debug)]
pub enum Intake {
    /// A connection wants a seat; the outbox is where the room's bus
    /// will deliver this player's events.
    Join {
        conn: ID<Conn>,
        outbox: UnboundedSender<Event>,
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    /// A seated player (or its transport) is gone.
    Leave { player: PlayerId },
    /// One raw client frame, still in wire form.
    Frame { player: PlayerId, raw: String },
    /// Countdown tick from the room's own ticker.
    Tick,
}

/// Handle to communicate with a running room.
///
/// Cheap to clone; the transport keeps one per connection. When the room
/// ends its task the sends start failing quietly, which is fine: the
/// registry watcher is already removing the handle.
#[derive(Clone)]
pub struct RoomHandle {
    id: ID<GameRoom>,
    tx: UnboundedSender<Intake>,
}

impl RoomHandle {
    pub(crate) fn new(id: ID<GameRoom>, tx: UnboundedSender<Intake>) -> Self {
        Self { id, tx }
    }
    pub fn id(&self) -> ID<GameRoom> {
        self.id
    }
    /// Requests a seat and waits for the room's verdict. `None` is the
    /// room's soft rejection (full, started, duplicate) or a room that
    /// is already gone.
    pub async fn join(&self, conn: ID<Conn>, outbox: UnboundedSender<Event>) -> Option<PlayerId> {
        let (reply, verdict) = oneshot::channel();
        self.tx
            .send(Intake::Join {
                conn,
                outbox,
                reply,
            })
            .ok()?;
        verdict.await.ok().flatten()
    }
    pub fn leave(&self, player: PlayerId) {
        let _ = self.tx.send(Intake::Leave { player });
    }
    pub fn frame(&self, player: PlayerId, raw: String) {
        let _ = self.tx.send(Intake::Frame { player, raw });
    }
}
