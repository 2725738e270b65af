//! Session driver
//!
//! Owns a [`Session`] and the three repeating tasks (countdown, spawn,
//! sweep) that drive it. The host feeds in its clock and play-area size;
//! the runner fires whatever came due and reports what happened.

use super::schedule::{Scheduler, TaskHandle, TaskKind};
use super::spawn::spawn_if_room;
use super::state::{GameEvent, PlayArea, Session};
use super::tick::{countdown, interact, start, sweep_expired};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy)]
struct SessionTasks {
    countdown: TaskHandle,
    spawn: TaskHandle,
    sweep: TaskHandle,
}

/// Drives one session against the host clock
#[derive(Debug, Clone)]
pub struct SessionRunner {
    session: Session,
    scheduler: Scheduler,
    tasks: Option<SessionTasks>,
}

impl SessionRunner {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            session: Session::new(tuning, seed),
            scheduler: Scheduler::new(),
            tasks: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the periodic tasks are live
    pub fn is_running(&self) -> bool {
        self.tasks.is_some()
    }

    /// Start (or restart) a session using the tuned budgets.
    ///
    /// The first spawn attempt is due immediately.
    pub fn start(&mut self, now_ms: u64) {
        let (secs, limit) = (
            self.session.tuning.session_seconds,
            self.session.tuning.miss_limit,
        );
        self.start_with(now_ms, secs, limit);
    }

    /// Start (or restart) with explicit time and miss budgets
    pub fn start_with(&mut self, now_ms: u64, duration_secs: u32, miss_limit: u32) {
        self.stop();
        start(&mut self.session, duration_secs, miss_limit);

        let tuning = &self.session.tuning;
        let countdown_ms = tuning.countdown_interval_ms;
        let sweep_ms = tuning.sweep_interval_ms;
        let spawn_ms = tuning.level(self.session.level).spawn_interval_ms;

        self.tasks = Some(SessionTasks {
            countdown: self
                .scheduler
                .schedule(TaskKind::Countdown, countdown_ms, now_ms.saturating_add(countdown_ms)),
            spawn: self.scheduler.schedule(TaskKind::Spawn, spawn_ms, now_ms),
            sweep: self
                .scheduler
                .schedule(TaskKind::Sweep, sweep_ms, now_ms.saturating_add(sweep_ms)),
        });
    }

    /// Cancel all periodic tasks. The session is frozen with its current
    /// values: nothing advances and pops are ignored until the next start.
    pub fn stop(&mut self) {
        if let Some(tasks) = self.tasks.take() {
            self.scheduler.cancel(tasks.countdown);
            self.scheduler.cancel(tasks.spawn);
            self.scheduler.cancel(tasks.sweep);
        }
    }

    /// Fire every task due at or before `now_ms`, each at its own due time
    pub fn advance(&mut self, now_ms: u64, area: PlayArea) -> Vec<GameEvent> {
        let mut events = Vec::new();

        while let Some(fired) = self.scheduler.pop_due(now_ms) {
            match fired.kind {
                TaskKind::Countdown => {
                    if let Some(outcome) = countdown(&mut self.session) {
                        events.push(GameEvent::SessionEnded { outcome });
                    }
                }
                TaskKind::Spawn => {
                    if let Some(id) = spawn_if_room(&mut self.session, area, fired.at_ms) {
                        events.push(GameEvent::BubbleSpawned { id });
                    }
                }
                TaskKind::Sweep => {
                    let sweep = sweep_expired(&mut self.session, fired.at_ms);
                    if !sweep.expired.is_empty() {
                        events.push(GameEvent::BubblesExpired { ids: sweep.expired });
                    }
                    if let Some(outcome) = sweep.ended {
                        events.push(GameEvent::SessionEnded { outcome });
                    }
                }
            }

            if !self.session.is_active() {
                self.stop();
                break;
            }
        }

        events
    }

    /// Pop a bubble on the player's behalf
    pub fn pop(&mut self, id: u32, now_ms: u64) -> Vec<GameEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        let level_before = self.session.level;
        if !interact(&mut self.session, id) {
            return Vec::new();
        }

        let mut events = vec![GameEvent::BubblePopped { id }];
        if self.session.level != level_before {
            let level = self.session.level;
            events.push(GameEvent::LevelUp { level });
            if let Some(tasks) = self.tasks {
                let period = self.session.tuning.level(level).spawn_interval_ms;
                self.scheduler.set_period(tasks.spawn, period, now_ms);
            }
        }
        events
    }

    /// Current spawn period, if running
    pub fn spawn_period(&self) -> Option<u64> {
        self.tasks.and_then(|t| self.scheduler.period(t.spawn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::SessionOutcome;
    use crate::sim::state::SessionPhase;

    const AREA: PlayArea = PlayArea {
        width: 800.0,
        height: 400.0,
    };

    fn spawned(events: &[GameEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::BubbleSpawned { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_spawns_immediately() {
        let mut runner = SessionRunner::new(Tuning::default(), 1);
        runner.start(10_000);
        let events = runner.advance(10_000, AREA);
        assert_eq!(spawned(&events).len(), 1);
        assert_eq!(runner.session().bubbles.len(), 1);
        assert_eq!(runner.spawn_period(), Some(2000));
    }

    #[test]
    fn test_time_runs_out() {
        let mut runner = SessionRunner::new(Tuning::default(), 2);
        runner.start(0);
        let mut ended = None;
        let mut now = 0;
        // Pop everything as soon as it appears so nothing is missed
        while ended.is_none() && now <= 60_000 {
            for event in runner.advance(now, AREA) {
                match event {
                    GameEvent::BubbleSpawned { id } => {
                        runner.pop(id, now);
                    }
                    GameEvent::SessionEnded { outcome } => ended = Some(outcome),
                    _ => {}
                }
            }
            now += 100;
        }
        let outcome = ended.expect("session should end");
        assert_eq!(runner.session().phase, SessionPhase::GameOver);
        assert_eq!(runner.session().time_remaining, 0);
        assert_eq!(outcome.total, outcome.score);
        assert!(outcome.score > 0);
        assert!(!runner.is_running());
        // Clock stopped just after 45s
        assert!((45_000..45_200).contains(&now));
    }

    #[test]
    fn test_misses_end_session_early() {
        let mut runner = SessionRunner::new(Tuning::default(), 3);
        runner.start(0);
        let mut ended = None;
        let mut now = 0;
        while ended.is_none() && now <= 60_000 {
            for event in runner.advance(now, AREA) {
                if let GameEvent::SessionEnded { outcome } = event {
                    ended = Some(outcome);
                }
            }
            now += 250;
        }
        let outcome = ended.expect("miss limit should end the session");
        assert_eq!(outcome, SessionOutcome::new(0, 10));
        assert_eq!(runner.session().missed, 10);
        assert!(runner.session().time_remaining > 0);
    }

    #[test]
    fn test_level_up_shortens_spawn_interval() {
        let mut tuning = Tuning::default();
        tuning.level_thresholds = vec![1, 2];
        let mut runner = SessionRunner::new(tuning, 4);
        runner.start(0);

        let id = spawned(&runner.advance(0, AREA))[0];
        let events = runner.pop(id, 100);
        assert_eq!(
            events,
            vec![GameEvent::BubblePopped { id }, GameEvent::LevelUp { level: 2 }]
        );
        assert_eq!(runner.spawn_period(), Some(1500));

        // Next spawn is one new period after the level-up
        assert!(spawned(&runner.advance(1_599, AREA)).is_empty());
        assert_eq!(spawned(&runner.advance(1_600, AREA)).len(), 1);
    }

    #[test]
    fn test_pop_unknown_bubble_is_noop() {
        let mut runner = SessionRunner::new(Tuning::default(), 5);
        runner.start(0);
        runner.advance(0, AREA);
        assert!(runner.pop(9_999, 10).is_empty());
        assert_eq!(runner.session().score, 0);
    }

    #[test]
    fn test_stop_cancels_tasks() {
        let mut runner = SessionRunner::new(Tuning::default(), 6);
        runner.start(0);
        runner.advance(0, AREA);
        runner.stop();
        assert!(!runner.is_running());
        assert!(runner.advance(100_000, AREA).is_empty());
        assert_eq!(runner.session().bubbles.len(), 1);
        assert_eq!(runner.session().time_remaining, 45);
    }

    #[test]
    fn test_pop_after_stop_is_ignored() {
        let mut runner = SessionRunner::new(Tuning::default(), 9);
        runner.start(0);
        let id = spawned(&runner.advance(0, AREA))[0];
        runner.stop();

        assert!(runner.pop(id, 100).is_empty());
        assert_eq!(runner.session().score, 0);
        assert!(runner.session().bubble(id).is_some());

        // A fresh start makes pops count again
        runner.start(200);
        let id = spawned(&runner.advance(200, AREA))[0];
        assert_eq!(runner.pop(id, 300), vec![GameEvent::BubblePopped { id }]);
        assert_eq!(runner.session().score, 1);
    }

    #[test]
    fn test_huge_timings_do_not_overflow() {
        let tuning = Tuning::from_json(
            r#"{
                "countdown_interval_ms": 18446744073709551000,
                "sweep_interval_ms": 18446744073709551000,
                "levels": [
                    { "spawn_interval_ms": 18446744073709551000, "base_lifespan_ms": 18446744073709551000 },
                    { "spawn_interval_ms": 1500, "base_lifespan_ms": 2500 },
                    { "spawn_interval_ms": 1000, "base_lifespan_ms": 2000 }
                ]
            }"#,
        )
        .expect("valid tuning");
        let mut runner = SessionRunner::new(tuning, 10);
        runner.start(1_000);
        let events = runner.advance(1_000, AREA);
        let id = spawned(&events)[0];
        let lifespan = runner.session().bubble(id).map(|b| b.lifespan_ms);
        assert!(matches!(lifespan, Some(l) if l >= 18_446_744_073_709_551_000));

        // Every next firing saturates past the far-future clock
        assert!(runner.advance(u64::MAX - 1, AREA).is_empty());
        assert!(runner.session().bubble(id).is_some());
        assert_eq!(runner.session().time_remaining, 45);
    }

    #[test]
    fn test_restart_mid_session() {
        let mut runner = SessionRunner::new(Tuning::default(), 7);
        runner.start(0);
        runner.advance(5_000, AREA);
        assert!(runner.session().time_remaining < 45);

        runner.start(5_000);
        let session = runner.session();
        assert!(session.bubbles.is_empty());
        assert_eq!(session.time_remaining, 45);
        assert_eq!(session.score + session.missed, 0);
        assert_eq!(session.level, 1);

        // Only the new tasks remain
        let events = runner.advance(5_000, AREA);
        assert_eq!(spawned(&events).len(), 1);
    }

    #[test]
    fn test_invalid_area_spawns_nothing() {
        let mut runner = SessionRunner::new(Tuning::default(), 8);
        runner.start(0);
        let events = runner.advance(10_000, PlayArea::new(0.0, 0.0));
        assert!(spawned(&events).is_empty());
        assert_eq!(runner.session().time_remaining, 35);
    }
}
