use super::*;

/// One discrete input in the replay vocabulary.
///
/// Clients batch these between flushes and the server replays the batch
/// strictly in order. The enumeration (rather than token-keyed dispatch)
/// buys exhaustive matching at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Left,
    Right,
    /// Manual soft drop: scores, and never locks when blocked.
    Down,
    /// Gravity tick: scores nothing, locks when blocked.
    AutoDown,
    RotateLeft,
    RotateRight,
    HardDrop,
    /// Plays the oldest held power-up against the opponent this many
    /// seats clockwise of the player.
    PowerUp(usize),
}

impl TryFrom<&str> for Command {
    type Error = &'static str;
    fn try_from(token: &str) -> Result<Self, Self::Error> {
        match token {
            "LEFT" => Ok(Command::Left),
            "RIGHT" => Ok(Command::Right),
            "DOWN" => Ok(Command::Down),
            "AUTO_DOWN" => Ok(Command::AutoDown),
            "ROTATE_LEFT" => Ok(Command::RotateLeft),
            "ROTATE_RIGHT" => Ok(Command::RotateRight),
            "HARD_DROP" => Ok(Command::HardDrop),
            "POWER_UP_1" => Ok(Command::PowerUp(1)),
            "POWER_UP_2" => Ok(Command::PowerUp(2)),
            "POWER_UP_3" => Ok(Command::PowerUp(3)),
            _ => Err("unrecognized command token"),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Command::Left => write!(f, "LEFT"),
            Command::Right => write!(f, "RIGHT"),
            Command::Down => write!(f, "DOWN"),
            Command::AutoDown => write!(f, "AUTO_DOWN"),
            Command::RotateLeft => write!(f, "ROTATE_LEFT"),
            Command::RotateRight => write!(f, "ROTATE_RIGHT"),
            Command::HardDrop => write!(f, "HARD_DROP"),
            Command::PowerUp(seat) => write!(f, "POWER_UP_{}", seat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for token in [
            "LEFT",
            "RIGHT",
            "DOWN",
            "AUTO_DOWN",
            "ROTATE_LEFT",
            "ROTATE_RIGHT",
            "HARD_DROP",
            "POWER_UP_1",
            "POWER_UP_2",
            "POWER_UP_3",
        ] {
            let command = Command::try_from(token).unwrap();
            assert_eq!(command.to_string(), token);
        }
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!(Command::try_from("JUMP").is_err());
        assert!(Command::try_from("left").is_err());
        assert!(Command::try_from("POWER_UP_4").is_err());
    }
}
