use std::time::{Duration, Instant};

use stagehand_core::profiling::profile_function;

/// Frame timing for the stage.
///
/// Inserted by `TimePlugin`. [`update`](Self::update) measures wall-clock time;
/// [`advance`](Self::advance) steps by a fixed amount, for headless hosts and
/// tests.
#[derive(Debug, Clone)]
pub struct Time {
    /// Total time advanced since creation
    elapsed: Duration,
    /// Time advanced by the last frame
    delta: Duration,
    frame_count: u64,
    /// Multiplier for `delta_seconds` (1.0 = normal, 0.0 = paused)
    time_scale: f32,
    /// Cap for a single frame's delta (default: 0.1s)
    max_delta: Duration,
    last_frame_time: Instant,
}

impl Time {
    pub fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frame_count: 0,
            time_scale: 1.0,
            max_delta: Duration::from_millis(100),
            last_frame_time: Instant::now(),
        }
    }

    /// Start a new frame, measuring the time since the previous one.
    pub fn update(&mut self) {
        profile_function!();
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.step(raw_delta);
    }

    /// Start a new frame that lasted exactly `delta` (before capping).
    pub fn advance(&mut self, delta: Duration) {
        self.last_frame_time = Instant::now();
        self.step(delta);
    }

    fn step(&mut self, raw_delta: Duration) {
        self.delta = raw_delta.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Scaled delta in seconds; what the view manager is ticked with.
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32() * self.time_scale
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Negative scales are clamped to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    #[inline]
    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    pub fn set_max_delta(&mut self, max_delta: Duration) {
        self.max_delta = max_delta;
    }

    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    pub fn resume(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
