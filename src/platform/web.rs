//! JS-facing game handle
//!
//! The page owns the DOM and calls into this from its animation frame. All
//! structured data crosses the boundary as JSON strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::settings::Settings;
use crate::sim::{GameEvent, PlayArea, SessionRunner};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Bubble Pop starting...");
}

/// Bubble as the page renders it
#[derive(Serialize)]
struct BubbleView<'a> {
    id: u32,
    x: f32,
    y: f32,
    size: u32,
    color: &'a str,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Serialization failed: {}", e);
        "null".to_string()
    })
}

/// One bubble game on the page
#[wasm_bindgen]
pub struct BubbleGame {
    runner: SessionRunner,
    area: PlayArea,
}

#[wasm_bindgen]
impl BubbleGame {
    /// Create a game using stored settings and a clock-derived seed
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> BubbleGame {
        let settings = Settings::load();
        let tuning = settings.tuning().unwrap_or_else(|e| {
            log::warn!("Settings rejected ({}), using defaults", e);
            crate::tuning::Tuning::default()
        });
        let seed = super::now_ms();
        log::info!("New bubble game (seed {}, {})", seed, settings.difficulty.as_str());
        BubbleGame {
            runner: SessionRunner::new(tuning, seed),
            area: PlayArea::new(width, height),
        }
    }

    /// Update the play-area size (call on resize)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.area = PlayArea::new(width, height);
    }

    pub fn start(&mut self) {
        self.runner.start(super::now_ms());
    }

    /// Run due tasks; returns the events as JSON
    pub fn advance(&mut self) -> String {
        let events = self.runner.advance(super::now_ms(), self.area);
        to_json(&events)
    }

    /// Pop a bubble by id; returns the events as JSON
    pub fn pop(&mut self, id: u32) -> String {
        let events = self.runner.pop(id, super::now_ms());
        to_json(&events)
    }

    /// Pop whatever bubble is under a click; returns the events as JSON
    pub fn pop_at(&mut self, x: f32, y: f32) -> String {
        let events: Vec<GameEvent> = match self.runner.session().bubble_at(glam::Vec2::new(x, y)) {
            Some(id) => self.runner.pop(id, super::now_ms()),
            None => Vec::new(),
        };
        to_json(&events)
    }

    /// Cancel timers (call when the game view unmounts)
    pub fn stop(&mut self) {
        self.runner.stop();
    }

    pub fn bubbles_json(&self) -> String {
        let session = self.runner.session();
        let views: Vec<BubbleView> = session
            .bubbles
            .iter()
            .map(|b| BubbleView {
                id: b.id,
                x: b.pos.x,
                y: b.pos.y,
                size: b.size,
                color: session.color_of(b),
            })
            .collect();
        to_json(&views)
    }

    pub fn hud_json(&self) -> String {
        to_json(&self.runner.session().hud())
    }

    /// Final result with percentage and observation, or `null` mid-game
    pub fn outcome_json(&self) -> String {
        #[derive(Serialize)]
        struct OutcomeView {
            score: u32,
            total: u32,
            percentage: u32,
            band: &'static str,
            observation: &'static str,
        }

        match self.runner.session().outcome() {
            Some(o) => to_json(&OutcomeView {
                score: o.score,
                total: o.total,
                percentage: o.percentage(),
                band: o.band().as_str(),
                observation: o.observation(),
            }),
            None => "null".to_string(),
        }
    }
}
