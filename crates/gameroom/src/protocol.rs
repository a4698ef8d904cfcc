use super::*;

/// Errors that can occur at the wire boundary.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    Malformed(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed client message: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Conversion layer between internal events and the wire envelope.
pub struct Protocol;

impl Protocol {
    /// Converts an internal Event to a wire ServerMessage.
    pub fn encode(event: &Event) -> ServerMessage {
        match event {
            Event::AddPlayer(id) => ServerMessage::AddPlayer(*id),
            Event::RemovePlayer(id) => ServerMessage::RemovePlayer(*id),
            Event::AddPieces(set) => ServerMessage::AddPieces(set.clone()),
            Event::UpdatePlayer { id, grid } => ServerMessage::UpdatePlayer {
                id: *id,
                grid: *grid,
            },
            Event::GameOver { id, grid, message } => ServerMessage::GameOver {
                id: *id,
                grid: *grid,
                message: message.clone(),
            },
            Event::AddPowerUp(kind) => ServerMessage::AddPowerUp(*kind),
            Event::UsePowerUp {
                power_up,
                source,
                target,
            } => ServerMessage::UsePowerUp {
                power_up: *power_up,
                source_player: *source,
                target_player: *target,
            },
            Event::GameMessage { header, body } => ServerMessage::GameMessage {
                header: header.clone(),
                body: body.clone(),
            },
        }
    }
    /// Parses one raw client frame.
    pub fn decode(raw: &str) -> Result<ClientMessage, ProtocolError> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
    /// Maps flushed tokens onto the command vocabulary. Unrecognized
    /// tokens are dropped here so the replay loop sees only real
    /// commands; they are steady-state noise, not faults.
    pub fn commands(tokens: &[String]) -> Vec<Command> {
        tokens
            .iter()
            .filter_map(|token| match Command::try_from(token.as_str()) {
                Ok(command) => Some(command),
                Err(_) => {
                    log::trace!("[protocol] dropping unrecognized token {:?}", token);
                    None
                }
            })
            .collect()
    }
}
