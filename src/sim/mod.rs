//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-supplied clock only
//! - Seeded RNG only
//! - Stable iteration order (by bubble ID)
//! - No rendering or platform dependencies

pub mod runner;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;

pub use runner::SessionRunner;
pub use schedule::{Fired, Scheduler, TaskHandle, TaskKind};
pub use spawn::spawn_if_room;
pub use state::{Bubble, GameEvent, Hud, PlayArea, Session, SessionPhase};
pub use tick::{Sweep, countdown, interact, start, sweep_expired, update_level};
