use super::Intake;
use qf_core::*;
use qf_gameroom::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Runs one room on its own task.
///
/// All intake — joins, leaves, client frames, countdown ticks — drains
/// through a single queue, so everything inside the room executes
/// strictly sequentially. The actor owns the countdown ticker; dropping
/// the actor mid-countdown cancels the whole chain in one motion.
pub struct RoomActor {
    room: GameRoom,
    intake: UnboundedReceiver<Intake>,
    loopback: UnboundedSender<Intake>,
    ticker: Option<Ticker>,
}

impl RoomActor {
    pub(crate) fn new(
        room: GameRoom,
        intake: UnboundedReceiver<Intake>,
        loopback: UnboundedSender<Intake>,
    ) -> Self {
        Self {
            room,
            intake,
            loopback,
            ticker: None,
        }
    }

    /// Drains intake until the room empties, then signals done so the
    /// registry can forget it.
    pub(crate) async fn run(mut self, done: oneshot::Sender<()>) {
        let id = self.room.id();
        log::debug!("[actor {}] room task up", id);
        while let Some(intake) = self.intake.recv().await {
            match intake {
                Intake::Join {
                    conn,
                    outbox,
                    reply,
                } => {
                    let _ = reply.send(self.room.join(conn, outbox));
                }
                Intake::Leave { player } => {
                    if self.room.leave(player) == RoomVitality::Empty {
                        log::info!("[actor {}] room emptied", id);
                        break;
                    }
                }
                Intake::Frame { player, raw } => self.dispatch(player, &raw),
                Intake::Tick => self.room.tick(),
            }
        }
        let _ = done.send(());
    }

    fn dispatch(&mut self, player: PlayerId, raw: &str) {
        match Protocol::decode(raw) {
            Ok(ClientMessage::Play) => {
                if self.room.ready(player) == ReadyVerdict::CountdownStarted {
                    // One tick per announcement plus the start itself.
                    self.ticker = Some(Ticker::spawn(
                        COUNTDOWN_TICKS + 1,
                        self.loopback.clone(),
                        || Intake::Tick,
                    ));
                }
            }
            Ok(ClientMessage::ExecuteCommands(tokens)) => self.room.execute(player, &tokens),
            Ok(ClientMessage::UsePowerUp { target_player }) => {
                self.room.use_power_up(player, target_player);
            }
            Err(error) => {
                log::debug!("[actor {}] dropping frame from P{}: {}", self.room.id(), player, error);
            }
        }
    }
}
