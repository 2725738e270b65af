//! Session state and core simulation types
//!
//! Everything the host needs to render or score a session lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::outcome::SessionOutcome;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Instructions shown, nothing running yet
    Instructions,
    /// Active gameplay
    Playing,
    /// Session ended (time or miss budget exhausted)
    GameOver,
}

/// A live bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: u32,
    /// Top-left corner in play-area pixels (whole numbers)
    pub pos: Vec2,
    /// Diameter in pixels
    pub size: u32,
    /// Index into `Tuning::palette`
    pub color_index: usize,
    /// Host clock at spawn (ms)
    pub created_at_ms: u64,
    pub lifespan_ms: u64,
}

impl Bubble {
    /// Age at `now_ms` (a clock running backwards reads as zero)
    #[inline]
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }

    /// True once the bubble has outlived its lifespan
    #[inline]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) > self.lifespan_ms
    }

    /// Center point, for hit testing
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size as f32 / 2.0)
    }

    /// Whether a point lies inside the bubble's circle
    pub fn contains_point(&self, point: Vec2) -> bool {
        let radius = self.size as f32 / 2.0;
        point.distance_squared(self.center()) <= radius * radius
    }
}

/// Rectangular play area reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Positive, finite dimensions
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Largest whole-pixel diameter that fits entirely inside the area
    pub fn max_fit(&self) -> u32 {
        if !self.is_valid() {
            return 0;
        }
        self.width.min(self.height).floor() as u32
    }

    /// Largest top-left corner that keeps a bubble of `size` fully visible
    pub fn max_origin(&self, size: u32) -> Vec2 {
        (Vec2::new(self.width, self.height) - Vec2::splat(size as f32)).max(Vec2::ZERO)
    }
}

/// Things that happened while advancing a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    BubbleSpawned { id: u32 },
    BubblePopped { id: u32 },
    BubblesExpired { ids: Vec<u32> },
    LevelUp { level: u8 },
    SessionEnded { outcome: SessionOutcome },
}

/// HUD values for the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: SessionPhase,
    pub score: u32,
    pub missed: u32,
    pub miss_limit: u32,
    pub misses_left: u32,
    pub level: u8,
    pub time_remaining: u32,
}

/// One bubble session
#[derive(Debug, Clone)]
pub struct Session {
    /// Balance values in force
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: SessionPhase,
    /// Seconds left on the clock
    pub time_remaining: u32,
    /// Bubbles popped
    pub score: u32,
    /// Bubbles expired
    pub missed: u32,
    /// Misses that end the session
    pub miss_limit: u32,
    /// Current difficulty level (1-based)
    pub level: u8,
    /// Live bubbles (sorted by id)
    pub bubbles: Vec<Bubble>,
    /// Bubbles spawned since the last start
    pub spawned_total: u32,
    pub(crate) rng: Pcg32,
    /// Final result, set when the session ends
    pub(crate) outcome: Option<SessionOutcome>,
    next_id: u32,
}

impl Session {
    /// Create a session waiting on its instructions screen
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            seed,
            phase: SessionPhase::Instructions,
            time_remaining: tuning.session_seconds,
            score: 0,
            missed: 0,
            miss_limit: tuning.miss_limit,
            level: 1,
            bubbles: Vec::new(),
            spawned_total: 0,
            rng: Pcg32::seed_from_u64(seed),
            outcome: None,
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a bubble ID. IDs keep increasing across restarts so a stale
    /// pop from a previous run never matches a new bubble.
    pub(crate) fn next_bubble_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    /// Pops plus misses so far
    pub fn attempts(&self) -> u32 {
        self.score + self.missed
    }

    pub fn misses_left(&self) -> u32 {
        self.miss_limit.saturating_sub(self.missed)
    }

    /// Final result, once the session is over
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn bubble(&self, id: u32) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Topmost live bubble under a point (later spawns draw on top)
    pub fn bubble_at(&self, point: Vec2) -> Option<u32> {
        self.bubbles
            .iter()
            .rev()
            .find(|b| b.contains_point(point))
            .map(|b| b.id)
    }

    /// Palette color of a bubble
    pub fn color_of(&self, bubble: &Bubble) -> &str {
        self.tuning
            .palette
            .get(bubble.color_index)
            .map(String::as_str)
            .unwrap_or("#000000")
    }

    pub fn hud(&self) -> Hud {
        Hud {
            phase: self.phase,
            score: self.score,
            missed: self.missed,
            miss_limit: self.miss_limit,
            misses_left: self.misses_left(),
            level: self.level,
            time_remaining: self.time_remaining,
        }
    }
}
