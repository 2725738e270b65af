//! Data-driven game balance
//!
//! Every budget, interval and threshold the session engine uses lives here so
//! hosts can retune the game without touching simulation code.

use serde::{Deserialize, Serialize};

/// Per-level timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelTuning {
    /// Delay between spawn attempts (ms)
    pub spawn_interval_ms: u64,
    /// Lifespan before jitter is added (ms)
    pub base_lifespan_ms: u64,
}

/// Why a [`Tuning`] was rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TuningError {
    #[error("at least one level is required")]
    NoLevels,

    #[error("expected {expected} level thresholds, found {found}")]
    ThresholdCount { expected: usize, found: usize },

    #[error("level thresholds must be strictly increasing")]
    ThresholdsNotIncreasing,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("bubble size range {min}..={max} is invalid")]
    SizeRange { min: u32, max: u32 },

    #[error("color palette is empty")]
    EmptyPalette,

    #[error("parse error: {0}")]
    Parse(String),
}

/// Balance values for one bubble session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Session time budget (seconds)
    pub session_seconds: u32,
    /// Session ends once this many bubbles have expired
    pub miss_limit: u32,
    /// Ceiling on simultaneously live bubbles
    pub max_concurrent: usize,
    /// Countdown task period (ms)
    pub countdown_interval_ms: u64,
    /// Expiry sweep period (ms)
    pub sweep_interval_ms: u64,
    /// Score needed to enter level 2, 3, ...
    pub level_thresholds: Vec<u32>,
    /// One entry per level, level 1 first
    pub levels: Vec<LevelTuning>,
    /// Upper bound (exclusive) of random lifespan jitter (ms)
    pub lifespan_jitter_ms: u64,
    /// Smallest bubble diameter (px)
    pub min_size: u32,
    /// Largest bubble diameter (px)
    pub max_size: u32,
    /// CSS colors a bubble can take
    pub palette: Vec<String>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            session_seconds: 45,
            miss_limit: 10,
            max_concurrent: 12,
            countdown_interval_ms: 1000,
            sweep_interval_ms: 500,
            level_thresholds: vec![10, 20],
            levels: vec![
                LevelTuning {
                    spawn_interval_ms: 2000,
                    base_lifespan_ms: 3000,
                },
                LevelTuning {
                    spawn_interval_ms: 1500,
                    base_lifespan_ms: 2500,
                },
                LevelTuning {
                    spawn_interval_ms: 1000,
                    base_lifespan_ms: 2000,
                },
            ],
            lifespan_jitter_ms: 1000,
            min_size: 30,
            max_size: 59,
            palette: ["#FF6B6B", "#4ECDC4", "#FFD166", "#118AB2", "#73D2DE"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.levels.is_empty() {
            return Err(TuningError::NoLevels);
        }
        if self.level_thresholds.len() != self.levels.len() - 1 {
            return Err(TuningError::ThresholdCount {
                expected: self.levels.len() - 1,
                found: self.level_thresholds.len(),
            });
        }
        if self.level_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TuningError::ThresholdsNotIncreasing);
        }
        if self.session_seconds == 0 {
            return Err(TuningError::Zero("session_seconds"));
        }
        if self.miss_limit == 0 {
            return Err(TuningError::Zero("miss_limit"));
        }
        if self.max_concurrent == 0 {
            return Err(TuningError::Zero("max_concurrent"));
        }
        if self.countdown_interval_ms == 0 {
            return Err(TuningError::Zero("countdown_interval_ms"));
        }
        if self.sweep_interval_ms == 0 {
            return Err(TuningError::Zero("sweep_interval_ms"));
        }
        if self.levels.iter().any(|l| l.spawn_interval_ms == 0) {
            return Err(TuningError::Zero("spawn_interval_ms"));
        }
        if self.min_size == 0 || self.min_size > self.max_size {
            return Err(TuningError::SizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.palette.is_empty() {
            return Err(TuningError::EmptyPalette);
        }
        Ok(())
    }

    /// Highest level reachable (1-based)
    pub fn max_level(&self) -> u8 {
        self.levels.len().min(u8::MAX as usize) as u8
    }

    /// Level for a score: 1 plus the number of thresholds reached
    pub fn level_for_score(&self, score: u32) -> u8 {
        let reached = self.level_thresholds.iter().filter(|&&t| score >= t).count();
        (1 + reached).min(self.max_level() as usize) as u8
    }

    /// Timing for a 1-based level (clamped to the configured range)
    pub fn level(&self, level: u8) -> LevelTuning {
        let idx = (level.max(1) as usize - 1).min(self.levels.len().saturating_sub(1));
        self.levels.get(idx).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_level_for_score() {
        let tuning = Tuning::default();
        assert_eq!(tuning.level_for_score(0), 1);
        assert_eq!(tuning.level_for_score(9), 1);
        assert_eq!(tuning.level_for_score(10), 2);
        assert_eq!(tuning.level_for_score(19), 2);
        assert_eq!(tuning.level_for_score(20), 3);
        assert_eq!(tuning.level_for_score(500), 3);
    }

    #[test]
    fn test_level_timing_shortens() {
        let tuning = Tuning::default();
        assert_eq!(tuning.level(1).spawn_interval_ms, 2000);
        assert_eq!(tuning.level(2).spawn_interval_ms, 1500);
        assert_eq!(tuning.level(3).spawn_interval_ms, 1000);
        assert_eq!(tuning.level(3).base_lifespan_ms, 2000);
        // Out of range clamps
        assert_eq!(tuning.level(0), tuning.level(1));
        assert_eq!(tuning.level(9), tuning.level(3));
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let mut tuning = Tuning::default();
        tuning.level_thresholds = vec![20, 10];
        assert_eq!(tuning.validate(), Err(TuningError::ThresholdsNotIncreasing));

        tuning.level_thresholds = vec![10];
        assert_eq!(
            tuning.validate(),
            Err(TuningError::ThresholdCount {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_rejects_bad_sizes_and_palette() {
        let mut tuning = Tuning::default();
        tuning.min_size = 70;
        assert!(matches!(tuning.validate(), Err(TuningError::SizeRange { .. })));

        let mut tuning = Tuning::default();
        tuning.palette.clear();
        assert_eq!(tuning.validate(), Err(TuningError::EmptyPalette));

        let mut tuning = Tuning::default();
        tuning.miss_limit = 0;
        assert_eq!(tuning.validate(), Err(TuningError::Zero("miss_limit")));
    }

    #[test]
    fn test_from_json_partial() {
        let tuning = Tuning::from_json(r#"{ "miss_limit": 3, "session_seconds": 20 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.miss_limit, 3);
        assert_eq!(tuning.session_seconds, 20);
        assert_eq!(tuning.max_concurrent, 12);

        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
        assert_eq!(
            Tuning::from_json(r#"{ "palette": [] }"#),
            Err(TuningError::EmptyPalette)
        );
    }
}
