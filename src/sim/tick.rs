//! Session operations
//!
//! Each function advances one independent process of the game: the
//! countdown, the expiry sweep and player pops. The host decides when each
//! runs (see `runner`).

use super::state::{Session, SessionPhase};
use crate::outcome::SessionOutcome;

/// Result of an expiry sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    /// IDs removed by this sweep
    pub expired: Vec<u32>,
    /// Set when the sweep pushed misses to the limit
    pub ended: Option<SessionOutcome>,
}

/// Reset the session and begin play.
///
/// Always safe to call: any previous run (live bubbles, counters, level,
/// clock) is discarded.
pub fn start(session: &mut Session, duration_secs: u32, miss_limit: u32) {
    session.phase = SessionPhase::Playing;
    session.time_remaining = duration_secs;
    session.miss_limit = miss_limit.max(1);
    session.score = 0;
    session.missed = 0;
    session.level = 1;
    session.bubbles.clear();
    session.spawned_total = 0;
    session.outcome = None;

    log::info!(
        "Session started: {}s, miss limit {} (seed {})",
        duration_secs,
        session.miss_limit,
        session.seed
    );
}

/// One countdown step. Returns the outcome when the clock runs out.
pub fn countdown(session: &mut Session) -> Option<SessionOutcome> {
    if !session.is_active() {
        return None;
    }
    session.time_remaining = session.time_remaining.saturating_sub(1);
    if session.time_remaining == 0 {
        log::info!("Time up");
        return Some(end_session(session));
    }
    None
}

/// Remove every bubble older than its lifespan and count them as misses.
pub fn sweep_expired(session: &mut Session, now_ms: u64) -> Sweep {
    if !session.is_active() {
        return Sweep::default();
    }

    let mut expired = Vec::new();
    session.bubbles.retain(|b| {
        if b.is_expired(now_ms) {
            expired.push(b.id);
            false
        } else {
            true
        }
    });

    if expired.is_empty() {
        return Sweep::default();
    }

    session.missed += expired.len() as u32;
    log::debug!(
        "{} bubble(s) expired, missed {}/{}",
        expired.len(),
        session.missed,
        session.miss_limit
    );

    let ended = if session.missed >= session.miss_limit {
        log::info!("Miss limit reached");
        Some(end_session(session))
    } else {
        None
    };

    Sweep { expired, ended }
}

/// Pop a bubble. Returns false if it is already gone (expired, popped, or
/// the session is not running).
pub fn interact(session: &mut Session, id: u32) -> bool {
    if !session.is_active() {
        return false;
    }
    let Some(idx) = session.bubbles.iter().position(|b| b.id == id) else {
        return false;
    };
    session.bubbles.remove(idx);
    session.score += 1;
    update_level(session);
    true
}

/// Raise the level to match the score. Never lowers it.
///
/// Returns the new level when it changed.
pub fn update_level(session: &mut Session) -> Option<u8> {
    let target = session.tuning.level_for_score(session.score);
    if target > session.level {
        session.level = target;
        log::info!("Level up: {} (score {})", target, session.score);
        Some(target)
    } else {
        None
    }
}

/// Deactivate the session and record its outcome
fn end_session(session: &mut Session) -> SessionOutcome {
    let outcome = SessionOutcome::new(session.score, session.attempts());
    session.phase = SessionPhase::GameOver;
    session.outcome = Some(outcome);
    log::info!(
        "Session over: {} popped of {} ({}%)",
        outcome.score,
        outcome.total,
        outcome.percentage()
    );
    outcome
}
