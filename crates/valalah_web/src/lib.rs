//! # Valalah Web
//!
//! The browser backend for the Valalah themes. Built for `wasm32`, it draws
//! particles as DOM nodes, drives them with browser timers and wires the
//! page lifecycle to the theme stage.
//!
//! ## Usage
//!
//! ```js
//! import init, { startTheme, cleanupWinterSnowflakes } from "./valalah_web.js";
//!
//! await init();
//! startTheme("winter");
//! // later, from the theme switcher
//! cleanupWinterSnowflakes();
//! ```
//!
//! On other targets only [`markup`] and [`console`] are compiled.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod console;
pub mod markup;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod page;
#[cfg(target_arch = "wasm32")]
pub mod sound;
#[cfg(target_arch = "wasm32")]
pub mod timers;

#[cfg(target_arch = "wasm32")]
pub use dom::DomSurface;
#[cfg(target_arch = "wasm32")]
pub use page::{start_theme, BrowserStage};
#[cfg(target_arch = "wasm32")]
pub use sound::{HtmlSound, HtmlSoundLoader};
#[cfg(target_arch = "wasm32")]
pub use timers::{BrowserScheduler, DispatchTarget};

/// Sends panics and `tracing` events to the browser console.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    console::init_console_logging();
}
