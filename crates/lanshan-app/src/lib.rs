//! Lanshan App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer). It assembles the
//! platform adapters and exposes one [`ChatApp`] handle to the page.

mod app;

pub use app::ChatApp;

use wasm_bindgen::prelude::*;

/// Called once when the module is instantiated.
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    log::info!("Lanshan WASM starting...");
}
