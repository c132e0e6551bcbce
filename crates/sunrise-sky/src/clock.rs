//! Tick scheduling: pause state, tick interval and frame rate presets.
//!
//! The clock never sleeps. The host asks [`AnimationClock::is_due`] whenever it
//! wakes up, runs the tick, and then calls [`AnimationClock::schedule_next`]
//! with the instant the tick finished, so a slow tick delays the next one
//! instead of overlapping it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use sunrise_config::AnimationConfig;

/// Fastest allowed tick interval.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(5);

/// Slowest allowed tick interval.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Whether ticks advance the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    /// Ticks fire on schedule.
    Running,
    /// Ticks are suppressed until the hold is released.
    Paused,
}

/// Self-rescheduling tick clock.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    state: ClockState,
    interval: Duration,
    fps: u32,
    presets: Vec<u32>,
    next_due: Instant,
}

impl AnimationClock {
    /// Running clock whose first tick is due after `first_tick_delay_ms`.
    pub fn new(config: &AnimationConfig, now: Instant) -> Self {
        let mut presets = config.fps_presets.clone();
        presets.retain(|&fps| fps > 0);
        presets.sort_unstable();
        presets.dedup();
        let interval = clamp_interval(Duration::from_millis(config.tick_interval_ms));
        Self {
            state: ClockState::Running,
            interval,
            fps: (1000 / interval.as_millis().max(1)) as u32,
            presets,
            next_due: now + Duration::from_millis(config.first_tick_delay_ms),
        }
    }

    /// Current state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Flip between running and paused, returning the new state.
    pub fn toggle_hold(&mut self) -> ClockState {
        self.state = match self.state {
            ClockState::Running => ClockState::Paused,
            ClockState::Paused => ClockState::Running,
        };
        self.state
    }

    /// Delay between the end of one tick and the start of the next.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Nominal frame rate the interval was derived from.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Switch to the next faster preset, wrapping to the slowest.
    pub fn faster(&mut self) -> u32 {
        let current = self.fps;
        let next = self
            .presets
            .iter()
            .copied()
            .find(|&fps| fps > current)
            .or_else(|| self.presets.first().copied());
        self.set_fps(next)
    }

    /// Switch to the next slower preset, wrapping to the fastest.
    pub fn slower(&mut self) -> u32 {
        let current = self.fps;
        let next = self
            .presets
            .iter()
            .rev()
            .copied()
            .find(|&fps| fps < current)
            .or_else(|| self.presets.last().copied());
        self.set_fps(next)
    }

    fn set_fps(&mut self, fps: Option<u32>) -> u32 {
        if let Some(fps) = fps {
            self.interval = clamp_interval(Duration::from_millis(1000 / u64::from(fps)));
            self.fps = fps;
        }
        self.fps
    }

    /// A tick should run now.
    pub fn is_due(&self, now: Instant) -> bool {
        self.is_running() && now >= self.next_due
    }

    /// Schedule the next tick one interval after `now`.
    pub fn schedule_next(&mut self, now: Instant) {
        self.next_due = now + self.interval;
    }

    /// Time left until the next tick, `None` while paused.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.is_running()
            .then(|| self.next_due.saturating_duration_since(now))
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL)
}

/// Measures the real tick rate over a rolling one-second window.
#[derive(Clone, Debug, Default)]
pub struct FpsMeter {
    ticks: VecDeque<Instant>,
}

impl FpsMeter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick at `now` and forget ticks older than the window.
    pub fn record(&mut self, now: Instant) {
        self.ticks.push_back(now);
        while let Some(&oldest) = self.ticks.front() {
            if now.saturating_duration_since(oldest) > Self::WINDOW {
                self.ticks.pop_front();
            } else {
                break;
            }
        }
    }

    /// Ticks in the last second.
    pub fn fps(&self) -> usize {
        self.ticks.len()
    }
}
