//! Score, countdown and best-score bookkeeping for one play session.

use std::cell::Cell;
use std::rc::Rc;

use log::{info, warn};
use thiserror::Error;

/// Persistence failed; the best score then only lives in memory.
#[derive(Debug, Error)]
#[error("high score store: {0}")]
pub struct StoreError(pub String);

/// Where the best score survives between page loads.
pub trait HighScoreStore {
    /// `None` when nothing (or nothing parsable) was stored.
    fn load(&self) -> Option<u32>;
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same slot so a test can keep a handle
/// after giving one to the session.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Rc<Cell<Option<u32>>>,
}

impl MemoryStore {
    pub fn with_value(score: u32) -> Self {
        Self { slot: Rc::new(Cell::new(Some(score))) }
    }

    pub fn get(&self) -> Option<u32> {
        self.slot.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Option<u32> {
        self.slot.get()
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        self.slot.set(Some(score));
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// One second elapsed.
    Tick { remaining: u32 },
    /// Countdown hit zero.
    Expired { final_score: u32, new_high_score: bool },
}

/// `m:ss`, e.g. 120 -> "2:00", 59 -> "0:59".
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub struct Session {
    score: u32,
    high_score: u32,
    time_remaining: u32,
    total_seconds: u32,
    running: bool,
    /// Milliseconds accumulated toward the next whole-second tick.
    pending_ms: u64,
    store: Box<dyn HighScoreStore>,
}

impl Session {
    pub fn new(total_seconds: u32, store: Box<dyn HighScoreStore>) -> Self {
        let high_score = store.load().unwrap_or(0);
        Self {
            score: 0,
            high_score,
            time_remaining: total_seconds,
            total_seconds,
            running: false,
            pending_ms: 0,
            store,
        }
    }

    /// Begin a countdown. Returns false (and changes nothing) if one is active.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.score = 0;
        self.time_remaining = self.total_seconds;
        self.pending_ms = 0;
        self.running = true;
        info!("session started: {}s on the clock", self.total_seconds);
        true
    }

    /// Stop unconditionally and restore the initial score / clock.
    pub fn reset(&mut self) {
        self.running = false;
        self.score = 0;
        self.time_remaining = self.total_seconds;
        self.pending_ms = 0;
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Feed elapsed wall time; emits one event per whole second crossed while
    /// running. Time fed while stopped is discarded.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }
        self.pending_ms += elapsed_ms;
        while self.running && self.pending_ms >= 1000 {
            self.pending_ms -= 1000;
            events.extend(self.tick());
        }
        events
    }

    /// One countdown second. A stopped session ignores ticks.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        if !self.running {
            return Vec::new();
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        let mut events = vec![SessionEvent::Tick { remaining: self.time_remaining }];
        if self.time_remaining == 0 {
            events.push(self.finish());
        }
        events
    }

    fn finish(&mut self) -> SessionEvent {
        self.running = false;
        self.pending_ms = 0;
        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
            if let Err(e) = self.store.save(self.score) {
                warn!("could not persist high score {}: {}", self.score, e);
            }
            info!("new high score {}", self.score);
        }
        info!("session over, final score {}", self.score);
        SessionEvent::Expired { final_score: self.score, new_high_score }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clock_label(&self) -> String {
        format_clock(self.time_remaining)
    }

    /// Width of the time bar, 0.0..=100.0.
    pub fn progress_percent(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        self.time_remaining as f64 / self.total_seconds as f64 * 100.0
    }
}
