//! Tap Earn: a tap-to-earn progression and economy engine with a browser
//! terminal front end.
//!
//! Everything under [`game`] except the view (`TapGame`, `render`,
//! `actions`) is plain Rust over [`store::DocumentStore`] and
//! [`time::Clock`], so it runs and tests natively. The wasm binary wires
//! it to `localStorage`, the browser clock and a `ratzilla` terminal.

pub mod auth;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod rng;
pub mod store;
pub mod time;
pub mod widgets;
