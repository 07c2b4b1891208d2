//! Chat client that relays messages to a user-configured webhook.
//!
//! Built for the browser (`wasm32`), where settings and history live in
//! `localStorage` and IndexedDB and messages go out through `fetch`. The
//! same library builds natively with file, SQLite and reqwest backends.

pub mod api;
pub mod client_info;
pub mod config;
pub mod db;
pub mod logging;
pub mod storage;
pub mod types;

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
pub use app::App;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    logging::init();
    let root = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id("root"));
    match root {
        Some(root) => {
            yew::Renderer::<App>::with_root(root).render();
        }
        None => {
            yew::Renderer::<App>::new().render();
        }
    }
}
