//! Browser DOM layer for the chronicle reading editor.
//!
//! This crate provides DOM rendering, selection reading and highlighting,
//! and browser event wiring around `chronicle-core`. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `render`: reading spans and the whitespace between them
//! - `dom_selection`: live selection → `RawSelection`, `selected` markers
//! - `editor`: `BrowserEditor`, the page-lifetime owner of `EditorState`
//! - `bindings`: `ChronicleEditor` for JavaScript widgets
//!
//! # Re-exports
//!
//! This crate re-exports `chronicle-core` for convenience.

// Re-export core crate
pub use chronicle_core;
pub use chronicle_core::*;

pub mod bindings;
pub mod dom_selection;
pub mod editor;
pub mod render;

pub use bindings::ChronicleEditor;
pub use dom_selection::{DomSelection, classify_point, is_reading, read_raw_selection};
pub use editor::{AlertNotifier, BrowserEditor};
pub use render::{READING_CLASS, SELECTED_CLASS, render_readings};

use wasm_bindgen::prelude::*;

/// Install the panic hook and console tracing.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
