//! Tap to Empire: an idle-progression economy (taps, producers, upgrades,
//! prestige, boosts and offline earnings) with a terminal UI in the browser.

pub mod app;
pub mod engine;
pub mod format;
pub mod render;
pub mod time;
