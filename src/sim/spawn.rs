//! Bubble spawning
//!
//! Draws size, position, lifespan and color from the session RNG. Draw order
//! is fixed so a seed always reproduces the same bubbles.

use glam::Vec2;
use rand::Rng;

use super::state::{Bubble, PlayArea, Session};

/// Spawn one bubble if the session has room for it.
///
/// Returns the new bubble's ID, or `None` when the session is inactive, the
/// concurrent ceiling is reached, or the play area cannot fit a bubble.
pub fn spawn_if_room(session: &mut Session, area: PlayArea, now_ms: u64) -> Option<u32> {
    if !session.is_active() {
        return None;
    }
    if session.bubbles.len() >= session.tuning.max_concurrent {
        return None;
    }

    let max_fit = area.max_fit();
    if !area.is_valid() || max_fit < session.tuning.min_size {
        log::warn!(
            "Play area {}x{} cannot fit a {}px bubble, skipping spawn",
            area.width,
            area.height,
            session.tuning.min_size
        );
        return None;
    }

    let min_size = session.tuning.min_size;
    let max_size = session.tuning.max_size.max(min_size).min(max_fit);
    let size = session.rng.random_range(min_size..=max_size);

    // Keep the whole bubble inside the area
    let limit = area.max_origin(size);
    let x = (session.rng.random::<f32>() * limit.x).floor().min(limit.x);
    let y = (session.rng.random::<f32>() * limit.y).floor().min(limit.y);

    let timing = session.tuning.level(session.level);
    let jitter = if session.tuning.lifespan_jitter_ms > 0 {
        session.rng.random_range(0..session.tuning.lifespan_jitter_ms)
    } else {
        0
    };
    let lifespan_ms = timing.base_lifespan_ms.saturating_add(jitter);

    let color_index = match session.tuning.palette.len() {
        0 => 0,
        n => session.rng.random_range(0..n),
    };

    let id = session.next_bubble_id();
    session.bubbles.push(Bubble {
        id,
        pos: Vec2::new(x, y),
        size,
        color_index,
        created_at_ms: now_ms,
        lifespan_ms,
    });
    session.spawned_total += 1;

    log::debug!(
        "Spawned bubble {} at ({}, {}) size {} lifespan {}ms",
        id,
        x,
        y,
        size,
        lifespan_ms
    );
    Some(id)
}
