//! Candy Spark core crate.
//!
//! Match-3 on a 6x6 board against a two minute clock. The game logic
//! (`grid`, `matcher`, `resolver`, `gesture`, `session`, `game`) is plain Rust
//! and runs natively; `web` is the browser front end driven from JS through
//! the exports below.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod game;
pub mod gesture;
pub mod grid;
mod logging;
pub mod matcher;
pub mod resolver;
pub mod session;
pub mod web;

pub use config::{CELL_COUNT, GameConfig, WIDTH};
pub use game::{Game, GameEvent, Stage};
pub use gesture::{DragState, SwapRejection, check_swap};
pub use grid::{Cell, Color, ColorSource, Grid, RandomColors};
pub use matcher::find_matches;
pub use session::{HighScoreStore, MemoryStore, Session, SessionEvent, format_clock};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(GameConfig::default().log_level);
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Build the board and HUD in the page and start the frame loop.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::mount().map_err(JsValue::from)
}

/// Same as pressing Start.
#[wasm_bindgen]
pub fn start_session() {
    web::start_session();
}

/// Same as pressing Reset.
#[wasm_bindgen]
pub fn reset_session() {
    web::reset_session();
}

/// Override settings with a JSON object before `start_game()`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(|e| error::UiError::Config(e.to_string()))?;
    web::set_config(config)?;
    Ok(())
}
