//! Interpolation primitives: lerp, easing, clamping.
//!
//! None of these validate their inputs. Callers clamp `t` where it matters.

use serde::{Deserialize, Serialize};

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Element-wise [`lerp`]. Extra elements of the longer slice are dropped.
pub fn lerp_vector(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(&a, &b)| lerp(a, b, t)).collect()
}

/// Cubic ease-in-out over `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Clamp to `[0, 1]`. NaN maps to 0.
pub fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Easing curve attached to an animated camera move.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    EaseInOutCubic,
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        let t = clamp_unit(t);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutCubic => ease_in_out_cubic(t),
        }
    }
}
