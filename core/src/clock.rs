use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Timer state captured into a save file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub elapsed_secs: u32,
    pub running: bool,
}

/// Whole-second game timer that can be paused and set from a save.
#[derive(Clone, Debug, Default)]
pub struct GameClock {
    banked_secs: u32,
    started_at: Option<Instant>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.banked_secs = self.banked_secs.saturating_add(secs_since(started_at));
        }
    }

    pub fn reset(&mut self) {
        self.banked_secs = 0;
        self.started_at = None;
    }

    /// How many seconds have been played, including any time banked before a pause.
    pub fn elapsed_secs(&self) -> u32 {
        let running = self.started_at.map_or(0, secs_since);
        self.banked_secs.saturating_add(running)
    }

    /// Overwrites the elapsed time, keeping the running state.
    pub fn set_elapsed(&mut self, secs: u32) {
        self.banked_secs = secs;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            elapsed_secs: self.elapsed_secs(),
            running: self.is_running(),
        }
    }

    pub fn restore(&mut self, snapshot: TimerSnapshot) {
        self.reset();
        self.banked_secs = snapshot.elapsed_secs;
        if snapshot.running {
            self.start();
        }
    }
}

fn secs_since(started_at: Instant) -> u32 {
    started_at.elapsed().as_secs().try_into().unwrap_or(u32::MAX)
}
