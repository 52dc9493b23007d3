//! # site-enhance
//!
//! Client-side behavior for a static portfolio site, compiled to WebAssembly.
//! Adds a persisted light/dark theme, a mobile navigation drawer, smooth
//! in-page anchor scrolling, scroll-triggered reveals and clickable cards.
//!
//! Every enhancement is written against the traits in [`host`], so the
//! behavior is exercised natively in tests. The `browser` feature provides
//! the `web-sys` host and the wasm start function.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | Boot sequencing across script, content-ready and load milestones |
//! | [`host`] | Element, document, storage, timer and page seams |
//! | [`config`] | Selectors, class names and delays, with JSON overrides |
//! | [`theme`] | Light/dark mode and its persisted preference |
//! | [`nav`] | Mobile navigation drawer |
//! | [`anchor`] | Smooth scrolling and focus for `#fragment` links |
//! | [`reveal`] | One-shot reveal on viewport intersection |
//! | [`card`] | Full-surface card navigation |
//! | [`scroll`] | Scroll restoration opt-out and post-load reset |
//! | [`year`] | Footer year |

pub mod anchor;
pub mod app;
pub mod card;
pub mod config;
pub mod error;
pub mod host;
pub mod nav;
pub mod reveal;
pub mod scroll;
pub mod theme;
pub mod year;

/// Module entry point: runs as soon as the wasm module is instantiated.
#[cfg(feature = "browser")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    host::browser::boot();
}
