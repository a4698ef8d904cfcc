use qf_core::*;
use qf_playfield::PieceKind;
use qf_playfield::PowerUpKind;
use serde::Deserialize;
use serde::Serialize;

/// Messages sent from server to client.
///
/// Serialized as the `{ type, data }` envelope with the canonical topic
/// name as the tag, so a client can dispatch on `type` alone.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    AddPlayer(PlayerId),
    RemovePlayer(PlayerId),
    AddPieces(Vec<PieceKind>),
    #[serde(rename_all = "camelCase")]
    UpdatePlayer { id: PlayerId, grid: Grid },
    #[serde(rename_all = "camelCase")]
    GameOver {
        id: PlayerId,
        grid: Grid,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    AddPowerUp(PowerUpKind),
    #[serde(rename_all = "camelCase")]
    UsePowerUp {
        power_up: PowerUpKind,
        source_player: PlayerId,
        target_player: PlayerId,
    },
    #[serde(rename_all = "camelCase")]
    GameMessage { header: String, body: Vec<String> },
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

/// Messages received from client.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Ready signal for the pre-game check.
    Play,
    /// One flushed batch of command tokens, in input order.
    ExecuteCommands(Vec<String>),
    /// Direct power-up play against a chosen opponent.
    #[serde(rename_all = "camelCase")]
    UsePowerUp { target_player: PlayerId },
}
