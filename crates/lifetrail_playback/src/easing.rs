// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves for stroke and highlight progress.

use serde::{Deserialize, Serialize};

/// Easing mode applied to normalized animation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Easing {
    /// Constant rate
    Linear,
    /// Slow start and finish
    #[default]
    EaseInOut,
}

impl Easing {
    /// Map normalized time `t` to progress; `t` is clamped to `[0, 1]`
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => hermite(0.0, 0.0, 1.0, 0.0, t),
        }
    }

    /// Eased progress of an animation started at `started_ms` lasting `duration_ms`
    pub fn progress(&self, started_ms: u64, duration_ms: u64, now_ms: u64) -> f64 {
        if duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(started_ms) as f64;
        self.apply(elapsed / duration_ms as f64)
    }
}

/// Linear interpolation between two floats
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite spline interpolation
pub fn hermite(p0: f64, m0: f64, p1: f64, m1: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [Easing::Linear, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
            assert_eq!(easing.apply(-1.0), 0.0);
        }
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let easing = Easing::EaseInOut;
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-9);
        assert!(easing.apply(0.25) < 0.25);
        assert!(easing.apply(0.75) > 0.75);
    }

    #[test]
    fn test_progress_over_time() {
        let easing = Easing::Linear;
        assert_eq!(easing.progress(100, 1000, 100), 0.0);
        assert_eq!(easing.progress(100, 1000, 600), 0.5);
        assert_eq!(easing.progress(100, 1000, 5000), 1.0);
        assert_eq!(easing.progress(100, 0, 100), 1.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}
