use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::SessionConfig;
use crate::game::GameSession;
use crate::types::Position;

/// JS-facing handle to one game.
#[wasm_bindgen]
pub struct ReversiEngine {
    session: GameSession,
}

#[wasm_bindgen]
impl ReversiEngine {
    /// `config` may be `undefined`, `null`, or `{ firstPlayer: "A" | "B" }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReversiEngine, JsError> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            session: GameSession::new(config),
        })
    }

    /// Squares the player on turn would flip at `(x, y)`, as `[{x, y}]`.
    pub fn check(&self, x: i32, y: i32) -> Result<JsValue, JsError> {
        let flips = self.session.check(Position::new(x, y)?)?;
        to_js(&flips)
    }

    pub fn place(&mut self, x: i32, y: i32) -> Result<JsValue, JsError> {
        let report = self.session.play(Position::new(x, y)?)?;
        to_js(&report)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.snapshot())
    }

    #[wasm_bindgen(js_name = "boardText")]
    pub fn board_text(&self) -> String {
        self.session.board().to_string()
    }

    #[wasm_bindgen(js_name = "currentPlayer")]
    pub fn current_player(&self) -> Option<String> {
        self.session.current_player().map(|player| player.to_string())
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}
