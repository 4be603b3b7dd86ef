use serde::Deserialize;

use crate::types::Player;

/// Options a caller may set when starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Player who moves first from the opening position.
    pub first_player: Player,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            first_player: Player::A,
        }
    }
}
