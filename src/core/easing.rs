use serde::{Deserialize, Serialize};

/// Values closer than this to their target snap onto it.
pub const SETTLE_EPSILON: f64 = 1e-4;

/// Frame-rate independent smoothing factor in `[0, 1)`.
///
/// `1 - exp(-sharpness * dt)` composes across frames: two steps of `dt`
/// move exactly as far as one step of `2 * dt`.
#[must_use]
pub fn smoothing_factor(sharpness: f64, delta_seconds: f64) -> f64 {
    if !sharpness.is_finite() || !delta_seconds.is_finite() || sharpness <= 0.0 {
        return 0.0;
    }
    if delta_seconds <= 0.0 {
        return 0.0;
    }
    1.0 - (-sharpness * delta_seconds).exp()
}

/// One exponential smoothing step: `old + (target - old) * factor`.
#[must_use]
pub fn ease_toward(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor.clamp(0.0, 1.0)
}

/// Scalar eased toward a target each frame (hover weight, explode weight).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EasedValue {
    value: f64,
    target: f64,
}

impl EasedValue {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            target: value,
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn target(self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    #[must_use]
    pub fn is_settled(self) -> bool {
        self.value == self.target
    }

    /// Advances one frame; returns `true` while the value is still moving.
    pub fn step(&mut self, sharpness: f64, delta_seconds: f64) -> bool {
        if self.is_settled() {
            return false;
        }
        let factor = smoothing_factor(sharpness, delta_seconds);
        self.value = ease_toward(self.value, self.target, factor);
        if (self.target - self.value).abs() <= SETTLE_EPSILON {
            self.value = self.target;
        }
        !self.is_settled()
    }
}

/// Entrance animation progress from collapsed (0) to fully grown (1).
///
/// Progress only moves forward; a fresh instance is the only way back to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthAnimation {
    progress: f64,
    rate_per_second: f64,
}

impl GrowthAnimation {
    #[must_use]
    pub fn new(rate_per_second: f64) -> Self {
        let rate_per_second = if rate_per_second.is_finite() && rate_per_second > 0.0 {
            rate_per_second
        } else {
            f64::INFINITY
        };
        Self {
            progress: 0.0,
            rate_per_second,
        }
    }

    #[must_use]
    pub fn progress(self) -> f64 {
        self.progress
    }

    /// Rewinds to zero progress, keeping the rate.
    pub fn reset(&mut self) {
        self.progress = 0.0;
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.progress >= 1.0
    }

    /// Advances by `rate * dt`, clamped to 1; returns `true` while growing.
    pub fn advance(&mut self, delta_seconds: f64) -> bool {
        if self.is_complete() {
            return false;
        }
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return true;
        }
        let step = self.rate_per_second * delta_seconds;
        self.progress = (self.progress + step).min(1.0);
        !self.is_complete()
    }
}
