//! Tap to Empire economy engine: state, cost and stat models, combo
//! tracking, the economy operations and persistence.
//!
//! The state is a plain owned value. The driver passes it to every
//! operation; nothing here reads the clock or global state.

pub mod combo;
pub mod logic;
pub mod rng;
pub mod save;
pub mod state;
pub mod stats;

pub use combo::Combo;
pub use logic::{OfflineEarnings, TapOutcome};
pub use rng::RandomSource;
pub use state::{EngineState, Producer, TapUpgrade, UpgradeKind};
pub use stats::Offer;
