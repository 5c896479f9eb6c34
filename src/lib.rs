//! # hotelops-console
//!
//! Leptos + WASM administrative console for the hotel operations platform.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages are thin; the interesting part is session coordination. `session`
//! owns credentials and single-flight renewal, `net` wraps every remote call
//! with credential attach + 401 recovery, `state` holds the route-guard and
//! polling state machines, and `util` hosts the browser-facing drivers.
//!
//! Browser glue is gated behind the `csr` feature so the coordination logic
//! runs and tests on the host.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// WASM entry point: install logging, then mount the console.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use leptos::prelude::*;

    console_error_panic_hook::set_once();

    let config = match config::SessionConfig::from_build_env() {
        Ok(config) => config,
        Err(e) => {
            web_sys::console::error_1(&format!("invalid console config: {e}").into());
            config::SessionConfig::default()
        }
    };
    let _ = console_log::init_with_level(config.log_level);

    leptos::mount::mount_to_body(move || view! { <app::App config/> });
}
