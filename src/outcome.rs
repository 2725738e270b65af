//! End-of-session result summary
//!
//! Turns the final (score, total) pair into the percentage, band and
//! observation shown on the results screen.

use serde::{Deserialize, Serialize};

/// Percentage at or above which a result counts as high
pub const HIGH_BAND_PERCENT: u32 = 85;
/// Percentage at or above which a result counts as medium
pub const MEDIUM_BAND_PERCENT: u32 = 60;

/// Coarse grading of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::High => "High",
            ScoreBand::Medium => "Medium",
            ScoreBand::Low => "Low",
        }
    }

    /// Results-screen observation for the bubble game
    pub fn observation(&self) -> &'static str {
        match self {
            ScoreBand::High => {
                "Tracks and reacts to moving targets quickly - strong visual attention and timing."
            }
            ScoreBand::Medium => {
                "Catches many targets but misses some - visual tracking is developing."
            }
            ScoreBand::Low => {
                "May benefit from activities that build visual tracking and quick reactions."
            }
        }
    }
}

/// Final (score, total) pair reported when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    /// Bubbles popped
    pub score: u32,
    /// Bubbles popped plus bubbles missed
    pub total: u32,
}

impl SessionOutcome {
    pub fn new(score: u32, total: u32) -> Self {
        Self { score, total }
    }

    /// Bubbles that got away
    pub fn missed(&self) -> u32 {
        self.total.saturating_sub(self.score)
    }

    /// Rounded success percentage (0 when nothing was attempted)
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let score = self.score.min(self.total) as u64;
        ((score * 100 + self.total as u64 / 2) / self.total as u64) as u32
    }

    /// Band from the exact ratio; the rounded percentage is display only
    pub fn band(&self) -> ScoreBand {
        if self.reaches(HIGH_BAND_PERCENT) {
            ScoreBand::High
        } else if self.reaches(MEDIUM_BAND_PERCENT) {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    /// Whether score/total is at least `percent`%
    fn reaches(&self, percent: u32) -> bool {
        self.total > 0
            && self.score.min(self.total) as u64 * 100 >= percent as u64 * self.total as u64
    }

    pub fn observation(&self) -> &'static str {
        self.band().observation()
    }
}
