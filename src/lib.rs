//! Bubble Pop - timed bubble-popping screening game
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (spawning, expiry, scoring)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `outcome`: Results summary
//! - `platform`: Browser/native platform abstraction

pub mod outcome;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use outcome::{ScoreBand, SessionOutcome};
pub use settings::{DifficultyPreset, Settings};
pub use tuning::{LevelTuning, Tuning, TuningError};

/// Host configuration constants
pub mod consts {
    /// Default play area (matches the web page's game panel)
    pub const DEFAULT_AREA_WIDTH: f32 = 832.0;
    pub const DEFAULT_AREA_HEIGHT: f32 = 400.0;

    /// Frame step for headless runs (ms)
    pub const HEADLESS_FRAME_MS: u64 = 50;
}
