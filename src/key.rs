use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keys the controller can press on behalf of the player.
///
/// The letter lanes are the piano-tile columns; the rest are menu triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    #[serde(rename = "d")]
    D,
    #[serde(rename = "f")]
    F,
    #[serde(rename = "j")]
    J,
    #[serde(rename = "k")]
    K,
    #[serde(rename = "`")]
    Backtick,
    #[serde(rename = "enter")]
    Enter,
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::D,
        Key::F,
        Key::J,
        Key::K,
        Key::Backtick,
        Key::Enter,
        Key::Up,
        Key::Down,
    ];

    /// Lane keys, left to right.
    pub const LANES: [Key; 4] = [Key::D, Key::F, Key::J, Key::K];

    pub fn as_str(&self) -> &'static str {
        match self {
            Key::D => "d",
            Key::F => "f",
            Key::J => "j",
            Key::K => "k",
            Key::Backtick => "`",
            Key::Enter => "enter",
            Key::Up => "up",
            Key::Down => "down",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Key {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown key label: {s:?}"))
    }
}
