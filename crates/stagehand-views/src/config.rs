use crate::priority::ViewPriority;

/// Configuration for a [`ViewManager`](crate::ViewManager).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManagerConfig {
    /// Priority used by `get_or_create` when none is given.
    pub default_priority: ViewPriority,
    /// Upper bound for a single tick's delta, in seconds.
    pub max_delta: f32,
    /// Multiplier applied to every (clamped) delta.
    pub time_scale: f32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            default_priority: ViewPriority::Medium,
            max_delta: 0.25,
            time_scale: 1.0,
        }
    }
}

impl ManagerConfig {
    pub fn with_default_priority(mut self, priority: ViewPriority) -> Self {
        self.default_priority = priority;
        self
    }

    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale.max(0.0);
        self
    }

    /// Clamp `dt` to `[0, max_delta]` and apply the time scale.
    ///
    /// Non-finite deltas count as zero, as do negative or NaN `max_delta`
    /// and `time_scale` values.
    pub fn scaled_delta(&self, dt: f32) -> f32 {
        if !dt.is_finite() {
            return 0.0;
        }
        // `f32::max` ignores NaN.
        let max_delta = self.max_delta.max(0.0);
        let time_scale = self.time_scale.max(0.0);
        let scaled = dt.clamp(0.0, max_delta) * time_scale;
        if scaled.is_finite() { scaled } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.default_priority, ViewPriority::Medium);
        assert_eq!(config.time_scale, 1.0);
    }

    #[test]
    fn test_scaled_delta() {
        let config = ManagerConfig::default()
            .with_max_delta(0.1)
            .with_time_scale(2.0);

        assert_eq!(config.scaled_delta(0.05), 0.1);
        assert_eq!(config.scaled_delta(1.0), 0.2);
        assert_eq!(config.scaled_delta(-1.0), 0.0);
        assert_eq!(config.scaled_delta(f32::NAN), 0.0);
    }

    #[test]
    fn test_invalid_fields_do_not_panic() {
        let mut config = ManagerConfig::default();
        config.max_delta = -0.1;
        assert_eq!(config.scaled_delta(0.016), 0.0);

        config.max_delta = f32::NAN;
        assert_eq!(config.scaled_delta(0.016), 0.0);

        config.max_delta = 0.25;
        config.time_scale = -1.0;
        assert_eq!(config.scaled_delta(0.016), 0.0);

        config.time_scale = f32::NAN;
        assert_eq!(config.scaled_delta(0.016), 0.0);
    }
}
