//! Browser host bindings
//!
//! Thin wasm-bindgen facade over [`Game`]. The host owns the canvas, the
//! pointer/keyboard wiring, the frame loop, and the ad countdown; it drives
//! the core through these entry points and renders from the snapshot and
//! piece views. All timestamps come from `Date.now()` here so the core never
//! reads the clock itself.

use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::sim::{Game, Rescale};
use crate::storage::LocalStorage;

/// Set up panic reporting and console logging once per page
fn init_platform() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[wasm_bindgen]
pub struct DropGame {
    game: Game,
}

#[wasm_bindgen]
impl DropGame {
    /// Create a session. `config_json` overrides the default variant
    /// configuration; invalid or missing JSON falls back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> DropGame {
        init_platform();
        let config: GameConfig = config_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        let seed = js_sys::Date::now() as u64;
        DropGame {
            game: Game::new(config, Box::new(LocalStorage::new()), seed),
        }
    }

    /// Advance one fixed step; call from the frame loop
    pub fn tick(&mut self) {
        self.game.tick(js_sys::Date::now());
    }

    /// Report a container resize. Returns true when the container was not
    /// yet measurable and the call should be retried next frame.
    pub fn on_resize(&mut self, width: f32, height: f32) -> bool {
        matches!(self.game.on_resize(width, height), Rescale::Deferred)
    }

    pub fn request_drop(&mut self, x: f32) {
        self.game.request_drop(x, js_sys::Date::now());
    }

    /// Discrete horizontal nudge of the aim position
    pub fn on_input(&mut self, dx: f32) {
        self.game.on_input(dx);
    }

    pub fn on_reset(&mut self) {
        self.game.on_reset();
    }

    /// Session snapshot as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.game.snapshot()).unwrap_or_default()
    }

    /// Live piece positions as JSON, for rendering
    pub fn pieces(&self) -> String {
        serde_json::to_string(&self.game.live_pieces()).unwrap_or_default()
    }
}
