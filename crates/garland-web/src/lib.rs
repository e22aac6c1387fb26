//! WebAssembly bridge exposing the choreographer to a JavaScript render surface.
//!
//! Only `hints` builds on the host; everything touching the browser lives in
//! the wasm32-only `bridge` module.

pub mod hints;

#[cfg(target_arch = "wasm32")]
mod bridge;

#[cfg(target_arch = "wasm32")]
pub use bridge::*;
