use std::{collections::VecDeque, time::Duration};

use chrono::{DateTime, Local, TimeDelta};

/// One slot of the metric history. `value == None` is a placeholder with no
/// observed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub value: Option<u64>,
}

impl Sample {
    pub fn observed(timestamp: DateTime<Local>, value: u64) -> Self {
        Self { timestamp, value: Some(value) }
    }

    pub fn placeholder(timestamp: DateTime<Local>) -> Self {
        Self { timestamp, value: None }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Real data has not reached the left edge yet.
    OldestIsPlaceholder,
    /// Scale already sits at the cap.
    ScaleCapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidenOutcome {
    Widened { added: usize, scale: u32 },
    Skipped(SkipReason),
}

/// Immutable view of the window handed to renderers once per cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub samples: Vec<Sample>,
    pub scale: u32,
    pub tick: u64,
}

impl WindowSnapshot {
    pub fn latest(&self) -> Option<u64> {
        self.samples.last().and_then(|s| s.value)
    }

    /// Y range for drawing: starts at zero, tops out at the largest observed
    /// value and never collapses below 1.
    pub fn value_bounds(&self) -> (f64, f64) {
        let max = self
            .samples
            .iter()
            .filter_map(|s| s.value)
            .max()
            .unwrap_or(0)
            .max(1);
        (0.0, max as f64)
    }
}

/// Fixed-length FIFO of samples with one-step-per-scale widening.
///
/// `len() == capacity()` holds after every operation. `append` evicts from
/// the front to keep it there; `widen` raises both together.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
    spacing: TimeDelta,
    scale: u32,
    max_scale: u32,
}

impl SlidingWindow {
    pub fn new(capacity: usize, spacing: Duration, max_scale: u32) -> Self {
        Self::new_at(capacity, spacing, max_scale, Local::now())
    }

    /// Pre-fills `capacity` placeholders spaced `spacing` apart, the last one
    /// `spacing` before `now`.
    pub fn new_at(capacity: usize, spacing: Duration, max_scale: u32, now: DateTime<Local>) -> Self {
        let spacing = TimeDelta::from_std(spacing).unwrap_or(TimeDelta::MAX);
        let mut samples = VecDeque::with_capacity(capacity);
        samples.extend(placeholders_before(now, capacity, spacing));
        Self {
            samples,
            capacity,
            spacing,
            scale: 1,
            max_scale,
        }
    }

    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Grows the window by `n` placeholders without evicting anything.
    ///
    /// The placeholders go in front of the current oldest sample, continuing
    /// its spacing backwards, so timestamps stay ordered.
    pub fn widen(&mut self, n: usize) {
        let anchor = match self.samples.front() {
            Some(oldest) => oldest.timestamp,
            None => Local::now(),
        };
        for sample in placeholders_before(anchor, n, self.spacing).into_iter().rev() {
            self.samples.push_front(sample);
        }
        self.capacity += n;
    }

    /// Widens by `n` and bumps the scale, but only once real data has reached
    /// the oldest slot and the scale is below its cap.
    pub fn try_widen(&mut self, n: usize) -> WidenOutcome {
        if self.scale >= self.max_scale {
            return WidenOutcome::Skipped(SkipReason::ScaleCapped);
        }
        match self.samples.front() {
            Some(oldest) if !oldest.is_placeholder() => {
                self.widen(n);
                self.scale += 1;
                WidenOutcome::Widened { added: n, scale: self.scale }
            }
            _ => WidenOutcome::Skipped(SkipReason::OldestIsPlaceholder),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn max_scale(&self) -> u32 {
        self.max_scale
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn snapshot(&self, tick: u64) -> WindowSnapshot {
        WindowSnapshot {
            samples: self.samples.iter().copied().collect(),
            scale: self.scale,
            tick,
        }
    }
}

/// `n` placeholders stepping back from `anchor`, oldest first. A step that
/// would leave the representable range repeats the previous timestamp, so the
/// result is always non-decreasing.
fn placeholders_before(anchor: DateTime<Local>, n: usize, spacing: TimeDelta) -> Vec<Sample> {
    let mut out = Vec::with_capacity(n);
    let mut timestamp = anchor;
    for _ in 0..n {
        timestamp = timestamp.checked_sub_signed(spacing).unwrap_or(timestamp);
        out.push(Sample::placeholder(timestamp));
    }
    out.reverse();
    out
}
