//! Fixed-cadence sampling loop.
//!
//! Every cycle widens the window when eligible and publishes a snapshot,
//! bumps the tick, waits one interval, then folds the event count into a new
//! sample. Every `poll_every` ticks it asks for a status poll. The cadence
//! comes from a tokio interval and does not depend on how long renderers
//! take to draw.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::DashboardConfig,
    counter::EventCounter,
    window::{Sample, SlidingWindow, WidenOutcome, WindowSnapshot},
};

/// Everything the sampler mutates, owned in one place.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub window: SlidingWindow,
    pub ticks: u64,
}

impl DashboardState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            window: SlidingWindow::new(config.samples, config.speed, config.max_scale),
            ticks: 0,
        }
    }
}

pub struct Sampler {
    state: DashboardState,
    counter: EventCounter,
    speed: Duration,
    widen_step: usize,
    poll_every: u64,
    snapshots: watch::Sender<WindowSnapshot>,
}

impl Sampler {
    pub fn new(config: &DashboardConfig, counter: EventCounter) -> (Self, watch::Receiver<WindowSnapshot>) {
        Self::with_state(DashboardState::new(config), config, counter)
    }

    pub fn with_state(
        state: DashboardState,
        config: &DashboardConfig,
        counter: EventCounter,
    ) -> (Self, watch::Receiver<WindowSnapshot>) {
        let (snapshots, rx) = watch::channel(state.window.snapshot(state.ticks));
        let sampler = Self {
            state,
            counter,
            speed: config.speed,
            widen_step: config.widen_step,
            poll_every: config.poll_every,
            snapshots,
        };
        (sampler, rx)
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// First half of a cycle: widen if eligible, publish, then count the tick.
    pub fn begin_cycle(&mut self) -> WidenOutcome {
        let outcome = self.state.window.try_widen(self.widen_step);
        if let WidenOutcome::Widened { added, scale } = outcome {
            debug!(added, scale, len = self.state.window.len(), "window widened");
        }
        self.publish();
        self.state.ticks += 1;
        outcome
    }

    /// Second half of a cycle: read-and-reset the counter into a sample.
    /// Returns true when this tick is due a status poll.
    pub fn complete_cycle(&mut self, now: DateTime<Local>) -> bool {
        let value = self.counter.read_and_reset();
        self.state.window.append(Sample::observed(now, value));
        self.state.ticks % self.poll_every == 0
    }

    /// Runs cycles until `cancel` fires, calling `on_poll` with the current
    /// tick whenever a status poll is due. Returns the final state.
    pub async fn run<F>(mut self, mut on_poll: F, cancel: CancellationToken) -> DashboardState
    where
        F: FnMut(u64),
    {
        let mut ticker = interval(self.speed);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately.
        ticker.tick().await;

        info!(speed_ms = self.speed.as_millis() as u64, poll_every = self.poll_every, "sampler started");
        loop {
            self.begin_cycle();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if self.complete_cycle(Local::now()) {
                on_poll(self.state.ticks);
            }
        }
        info!(ticks = self.state.ticks, "sampler stopped");
        self.state
    }

    fn publish(&self) {
        self.snapshots
            .send_replace(self.state.window.snapshot(self.state.ticks));
    }
}

/// Waits for a spawned `Sampler::run`. A panicked or aborted sampler is
/// logged at warn and yields `None`.
pub async fn join(task: JoinHandle<DashboardState>) -> Option<DashboardState> {
    match task.await {
        Ok(state) => Some(state),
        Err(err) => {
            warn!(error = %err, "sampler task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::SkipReason;

    fn config() -> DashboardConfig {
        DashboardConfig::default()
    }

    #[test]
    fn cycle_appends_counted_events() {
        let counter = EventCounter::new();
        let (mut sampler, rx) = Sampler::new(&config(), counter.clone());

        sampler.begin_cycle();
        for _ in 0..5 {
            counter.increment();
        }
        sampler.complete_cycle(Local::now());

        assert_eq!(sampler.state().window.newest().unwrap().value, Some(5));
        assert_eq!(sampler.state().window.len(), 20);
        assert_eq!(counter.peek(), 0);
        assert_eq!(sampler.state().ticks, 1);

        // The snapshot from begin_cycle predates the append.
        assert_eq!(rx.borrow().latest(), None);
        sampler.begin_cycle();
        assert_eq!(rx.borrow().latest(), Some(5));
        assert_eq!(rx.borrow().tick, 1);
    }

    #[test]
    fn poll_due_every_nth_tick() {
        let (mut sampler, _rx) = Sampler::new(&config(), EventCounter::new());
        let due: Vec<u64> = (0..35)
            .filter_map(|_| {
                sampler.begin_cycle();
                sampler.complete_cycle(Local::now()).then_some(sampler.state().ticks)
            })
            .collect();
        assert_eq!(due, vec![10, 20, 30]);
    }

    #[test]
    fn widens_once_data_reaches_left_edge() {
        let (mut sampler, rx) = Sampler::new(&config(), EventCounter::new());
        for _ in 0..20 {
            assert_eq!(
                sampler.begin_cycle(),
                WidenOutcome::Skipped(SkipReason::OldestIsPlaceholder)
            );
            sampler.complete_cycle(Local::now());
        }
        assert_eq!(sampler.begin_cycle(), WidenOutcome::Widened { added: 10, scale: 2 });
        assert_eq!(rx.borrow().samples.len(), 30);
        assert_eq!(rx.borrow().scale, 2);
    }

    #[test]
    fn widening_stops_at_max_scale() {
        let (mut sampler, _rx) = Sampler::new(&config(), EventCounter::new());
        let mut widens = 0;
        for _ in 0..500 {
            if matches!(sampler.begin_cycle(), WidenOutcome::Widened { .. }) {
                widens += 1;
            }
            sampler.complete_cycle(Local::now());
        }
        assert_eq!(widens, 3);
        assert_eq!(sampler.state().window.scale(), 4);
        assert_eq!(sampler.state().window.len(), 50);
    }

    #[tokio::test]
    async fn join_reports_a_dead_sampler() {
        async fn explode() -> DashboardState {
            panic!("sampler blew up")
        }
        let task = tokio::spawn(explode());
        assert!(join(task).await.is_none());

        let state = DashboardState::new(&config());
        let task = tokio::spawn(async move { state });
        assert_eq!(join(task).await.map(|s| s.ticks), Some(0));
    }
}
