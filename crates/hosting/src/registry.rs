use super::Intake;
use super::RoomActor;
use super::RoomHandle;
use qf_core::*;
use qf_gameroom::GameRoom;
use qf_gameroom::GameType;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

/// Manages active game rooms and their lifecycles.
///
/// The explicit room-lookup service: constructed once, passed to the
/// transport layer, never reached through ambient globals. Rooms remove
/// themselves — the actor signals done when its room empties and a
/// watcher task deletes the handle.
#[derive(Default)]
pub struct Registry {
    rooms: RwLock<HashMap<ID<GameRoom>, RoomHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a room of the given mode, spawns its actor, and returns the
    /// room id for the transport to hand out.
    pub async fn create(self: &Arc<Self>, game_type: GameType) -> ID<GameRoom> {
        let id = ID::default();
        let (tx, rx) = unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();
        let handle = RoomHandle::new(id, tx.clone());
        self.rooms.write().await.insert(id, handle);
        let actor = RoomActor::new(GameRoom::new(id, game_type), rx, tx);
        tokio::spawn(actor.run(done_tx));
        let registry = self.clone();
        tokio::spawn(async move {
            let _ = done_rx.await;
            let _ = registry.delete(id).await;
            log::info!("[registry] room {} cleaned up", id);
        });
        log::debug!("[registry] created {:?} room {}", game_type, id);
        id
    }

    /// Looks up a live room's handle.
    pub async fn get(&self, id: ID<GameRoom>) -> Option<RoomHandle> {
        self.rooms.read().await.get(&id).cloned()
    }

    /// Removes a room from the registry.
    pub async fn delete(&self, id: ID<GameRoom>) -> anyhow::Result<()> {
        self.rooms
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow::anyhow!("room not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qf_core::BAG_SET_LEN;
    use qf_gameroom::Event;
    use serde_json::json;

    fn frame(value: serde_json::Value) -> String {
        value.to_string()
    }

    #[tokio::test]
    async fn create_get_delete_round_trip() {
        let registry = Arc::new(Registry::new());
        let id = registry.create(GameType::Multi).await;
        assert!(registry.get(id).await.is_some());
        assert!(registry.delete(id).await.is_ok());
        assert!(registry.get(id).await.is_none());
        assert!(registry.delete(id).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn a_solo_game_starts_over_the_handle() {
        let registry = Arc::new(Registry::new());
        let id = registry.create(GameType::Single).await;
        let handle = registry.get(id).await.unwrap();

        let (outbox, mut events) = unbounded_channel();
        let player = handle.join(ID::default(), outbox).await.expect("seated");
        match events.recv().await.expect("room alive") {
            Event::AddPlayer(id) => assert_eq!(id, player),
            other => panic!("unexpected join event: {}", other),
        }

        handle.frame(player, frame(json!({ "type": "PLAY" })));
        // Countdown announcements, the shared set, then the start cue.
        let mut headers = Vec::new();
        loop {
            match events.recv().await.expect("room alive") {
                Event::GameMessage { header, .. } => {
                    let started = header == "start";
                    headers.push(header);
                    if started {
                        break;
                    }
                }
                Event::AddPieces(set) => assert_eq!(set.len(), BAG_SET_LEN),
                other => panic!("unexpected pre-start event: {}", other),
            }
        }
        assert_eq!(headers, vec!["countdown", "countdown", "countdown", "start"]);

        handle.frame(
            player,
            frame(json!({ "type": "EXECUTE_COMMANDS", "data": ["HARD_DROP"] })),
        );
        loop {
            if let Event::UpdatePlayer { id, grid } = events.recv().await.expect("room alive") {
                assert_eq!(id, player);
                assert!(grid.iter().flatten().any(|&c| c != 0));
                break;
            }
        }

        // Leaving empties the room; the watcher tears it down.
        handle.leave(player);
        assert!(events.recv().await.is_none());
        while registry.get(id).await.is_some() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn malformed_frames_are_dropped_quietly() {
        let registry = Arc::new(Registry::new());
        let id = registry.create(GameType::Multi).await;
        let handle = registry.get(id).await.unwrap();
        let (outbox, mut events) = unbounded_channel();
        let player = handle.join(ID::default(), outbox).await.expect("seated");
        match events.recv().await.expect("room alive") {
            Event::AddPlayer(id) => assert_eq!(id, player),
            other => panic!("unexpected join event: {}", other),
        }
        handle.frame(player, "not json at all".into());
        handle.frame(player, frame(json!({ "type": "PLAY" })));
        // The PLAY after the garbage frame still lands: a lone ready in
        // multiplayer produces its notice.
        match events.recv().await.expect("room alive") {
            Event::GameMessage { header, .. } => assert_eq!(header, "notice"),
            other => panic!("unexpected event: {}", other),
        }
    }
}
