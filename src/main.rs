//! Bubble Pop entry point
//!
//! The web build is driven from the page through `platform::web`. Natively
//! this runs a headless session with a simulated player, which is handy for
//! checking balance changes.
//!
//! Usage: `bubble-pop [seed] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use bubble_pop::consts::*;
    use bubble_pop::sim::{GameEvent, PlayArea, SessionRunner};
    use bubble_pop::{SessionOutcome, Settings};

    /// Simulated player: reacts after a random delay and sometimes hesitates
    /// long enough to let a bubble escape.
    struct Autoplayer {
        rng: Pcg32,
        /// (bubble id, time it will be popped)
        targets: Vec<(u32, u64)>,
    }

    impl Autoplayer {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                targets: Vec::new(),
            }
        }

        fn notice(&mut self, id: u32, now_ms: u64) {
            let reaction = self.rng.random_range(400..1800);
            let hesitation = if self.rng.random_bool(0.2) { 3000 } else { 0 };
            self.targets.push((id, now_ms + reaction + hesitation));
        }

        fn ready(&mut self, now_ms: u64) -> Vec<u32> {
            let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.targets)
                .into_iter()
                .partition(|(_, at)| *at <= now_ms);
            self.targets = pending;
            due.into_iter().map(|(id, _)| id).collect()
        }
    }

    pub fn run(seed: u64, settings: &Settings) -> Result<SessionOutcome, String> {
        let tuning = settings.tuning().map_err(|e| e.to_string())?;
        let area = PlayArea::new(DEFAULT_AREA_WIDTH, DEFAULT_AREA_HEIGHT);
        let mut runner = SessionRunner::new(tuning, seed);
        let mut player = Autoplayer::new(seed.wrapping_add(1));

        log::info!(
            "Headless session: seed {}, difficulty {}",
            seed,
            settings.difficulty.as_str()
        );

        let mut now = 0;
        runner.start(now);
        loop {
            for event in runner.advance(now, area) {
                log::debug!("{:?}", event);
                match event {
                    GameEvent::BubbleSpawned { id } => player.notice(id, now),
                    GameEvent::SessionEnded { outcome } => return Ok(outcome),
                    _ => {}
                }
            }
            for id in player.ready(now) {
                for event in runner.pop(id, now) {
                    if let GameEvent::LevelUp { level } = event {
                        log::info!("Reached level {} at {:.1}s", level, now as f64 / 1000.0);
                    }
                }
            }
            now += HEADLESS_FRAME_MS;
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bubble_pop::Settings;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(bubble_pop::platform::now_ms);

    let settings = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Settings::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to load settings from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Settings::load(),
    };

    match headless::run(seed, &settings) {
        Ok(outcome) => {
            println!(
                "Popped {} of {} bubbles ({}%) - {}",
                outcome.score,
                outcome.total,
                outcome.percentage(),
                outcome.band().as_str()
            );
            println!("{}", outcome.observation());
        }
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
