use wasm_bindgen::prelude::*;

pub mod api;
pub mod board;
pub mod config;
pub mod game;
pub mod notation;
pub mod types;

pub use board::{Board, CheckError, PlaceError, SharedBoard};
pub use config::SessionConfig;
pub use game::{GameError, GameSession, advance, has_legal_move, legal_moves, settle_turn};
pub use types::{CellState, GameOutcome, Player, Position, TurnState};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
