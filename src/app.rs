use std::time::Duration;

use chrono::{DateTime, Local};

use crate::{
    push::PushState,
    status::{StatusBoard, StatusUpdate},
    util::per_second,
    window::WindowSnapshot,
};

// Front-end state, fed by the sampler, the push task and the status poller
pub struct App {
    pub snapshot: WindowSnapshot,
    pub status: StatusBoard,
    pub push_state: PushState,
    pub total_events: u64,
    pub peak_record: (u64, DateTime<Local>),
    tick_ms: u64,
}

impl App {
    pub fn new(snapshot: WindowSnapshot, tick: Duration) -> App {
        App {
            snapshot,
            status: StatusBoard::new(),
            push_state: PushState::Connecting,
            total_events: 0,
            peak_record: (0, Local::now()),
            tick_ms: tick.as_millis() as u64,
        }
    }

    /// Takes a new window snapshot. Totals only move when the tick advanced,
    /// since the sampler republishes the same data on every cycle.
    /// Adopts the latest window. Each tick appends exactly one sample, so a
    /// jump of `n` ticks means the last `n` samples are new to us; all of them
    /// are folded into the totals, including ones whose publish was missed.
    pub fn on_snapshot(&mut self, snapshot: WindowSnapshot) {
        let fresh = snapshot.tick.saturating_sub(self.snapshot.tick);
        self.snapshot = snapshot;
        let len = self.snapshot.samples.len();
        let fresh = usize::try_from(fresh).unwrap_or(usize::MAX).min(len);
        for sample in &self.snapshot.samples[len - fresh..] {
            if let Some(value) = sample.value {
                self.total_events += value;
                if value > self.peak_record.0 {
                    self.peak_record = (value, sample.timestamp);
                }
            }
        }
    }

    pub fn on_status(&mut self, update: StatusUpdate) -> bool {
        self.status.apply(update)
    }

    pub fn on_push_state(&mut self, state: PushState) {
        self.push_state = state;
    }

    pub fn current_rate(&self) -> f64 {
        per_second(self.snapshot.latest().unwrap_or(0), self.tick_ms)
    }

    pub fn peak_rate(&self) -> f64 {
        per_second(self.peak_record.0, self.tick_ms)
    }
}
