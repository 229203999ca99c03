use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PlayerId);

impl PlayerId {
    /// Row used for requests that carry no Farcaster fid (the probe route,
    /// bodies without untrusted data).
    pub const ANONYMOUS: PlayerId = PlayerId(1);
}

/// Player marker coordinates. `x` counts columns from the left, `y` counts
/// rows from the bottom of the rendered grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Frame buttons are 1-indexed and laid out in this order.
    pub fn from_button_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Action::Up),
            2 => Some(Action::Down),
            3 => Some(Action::Left),
            4 => Some(Action::Right),
            _ => None,
        }
    }

    /// Probe codes reuse the button numbering as path segments.
    pub fn from_probe_code(code: &str) -> Option<Self> {
        code.parse::<u8>().ok().and_then(Self::from_button_index)
    }

    pub fn delta(self) -> (i64, i64) {
        match self {
            Action::Up => (0, 1),
            Action::Down => (0, -1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        }
    }

    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Open,
    Wall,
}

/// Outcome of applying an [`Action`] to a [`Position`]. A step whose target
/// is off the grid or a wall is `Blocked` and keeps the input position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "position", rename_all = "snake_case")]
pub enum Transition {
    Moved(Position),
    Blocked(Position),
}

impl Transition {
    pub fn position(self) -> Position {
        match self {
            Transition::Moved(position) | Transition::Blocked(position) => position,
        }
    }

    pub fn moved(self) -> bool {
        matches!(self, Transition::Moved(_))
    }
}
