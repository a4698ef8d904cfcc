use qf_core::*;
use qf_playfield::PieceKind;
use qf_playfield::PowerUpKind;

/// Events carried over the room's bus, one kind per payload shape.
#[derive(Clone, Debug)]
pub enum Event {
    /// A member joined (or is being announced to a joiner).
    AddPlayer(PlayerId),
    /// A member left.
    RemovePlayer(PlayerId),
    /// One shared shuffled set, appended to every member's sequence.
    AddPieces(Vec<PieceKind>),
    /// Authoritative grid snapshot after a replayed command batch.
    UpdatePlayer { id: PlayerId, grid: Grid },
    /// A player's run reached its terminal state.
    GameOver {
        id: PlayerId,
        grid: Grid,
        message: Option<String>,
    },
    /// A power-up entered the addressed player's inventory.
    AddPowerUp(PowerUpKind),
    /// A power-up was applied, so mirrors can animate the effect.
    UsePowerUp {
        power_up: PowerUpKind,
        source: PlayerId,
        target: PlayerId,
    },
    /// Flash notice or countdown text.
    GameMessage { header: String, body: Vec<String> },
}

/// Subscription key: the discriminant of [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    AddPlayer,
    RemovePlayer,
    AddPieces,
    UpdatePlayer,
    GameOver,
    AddPowerUp,
    UsePowerUp,
    GameMessage,
}

impl Topic {
    pub const ALL: [Topic; 8] = [
        Topic::AddPlayer,
        Topic::RemovePlayer,
        Topic::AddPieces,
        Topic::UpdatePlayer,
        Topic::GameOver,
        Topic::AddPowerUp,
        Topic::UsePowerUp,
        Topic::GameMessage,
    ];
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::AddPlayer(_) => Topic::AddPlayer,
            Event::RemovePlayer(_) => Topic::RemovePlayer,
            Event::AddPieces(_) => Topic::AddPieces,
            Event::UpdatePlayer { .. } => Topic::UpdatePlayer,
            Event::GameOver { .. } => Topic::GameOver,
            Event::AddPowerUp(_) => Topic::AddPowerUp,
            Event::UsePowerUp { .. } => Topic::UsePowerUp,
            Event::GameMessage { .. } => Topic::GameMessage,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::AddPlayer(id) => write!(f, "add player P{}", id),
            Event::RemovePlayer(id) => write!(f, "remove player P{}", id),
            Event::AddPieces(set) => write!(f, "add {} pieces", set.len()),
            Event::UpdatePlayer { id, .. } => write!(f, "update P{}", id),
            Event::GameOver { id, .. } => write!(f, "game over P{}", id),
            Event::AddPowerUp(kind) => write!(f, "add power-up: {}", kind),
            Event::UsePowerUp {
                power_up,
                source,
                target,
            } => write!(f, "P{} uses {} on P{}", source, power_up, target),
            Event::GameMessage { header, .. } => write!(f, "message: {}", header),
        }
    }
}
