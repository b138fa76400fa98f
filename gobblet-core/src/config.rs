use serde::{Deserialize, Serialize};

use crate::Color;

/// Settings fixed at game start.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Who moves first. Red by default.
    pub first_player: Color,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            first_player: Color::Red,
        }
    }
}
