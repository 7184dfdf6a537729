//! Evaluation curves for easing and custom height response
//!
//! A curve maps a normalized input (usually 0..=1) to an output value.

use serde::{Deserialize, Serialize};

/// A single control point of a keyframed curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Curve used for transition easing and the custom offset mode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Curve {
    /// Identity on 0..=1
    Linear,
    /// Smoothstep ease in and out on 0..=1
    #[default]
    EaseInOut,
    /// Piecewise-linear through keyframes sorted by time, flat outside the range
    Keyframes(Vec<Keyframe>),
}

impl Curve {
    /// Build a keyframed curve (keyframes are sorted by time)
    pub fn from_keyframes(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Curve::Keyframes(keys)
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            Curve::Linear => t.clamp(0.0, 1.0),
            Curve::EaseInOut => {
                let t = t.clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
            Curve::Keyframes(keys) => evaluate_keyframes(keys, t),
        }
    }
}

fn evaluate_keyframes(keys: &[Keyframe], t: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return 0.0;
    };
    if t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }

    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.time {
            let span = b.time - a.time;
            if span <= f32::EPSILON {
                return b.value;
            }
            let u = (t - a.time) / span;
            return a.value + (b.value - a.value) * u;
        }
    }
    last.value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_in_out_endpoints() {
        let curve = Curve::EaseInOut;
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(1.0), 1.0);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!(curve.evaluate(0.25) < 0.25);
        assert_eq!(curve.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_keyframes_interpolate_and_clamp() {
        let curve = Curve::from_keyframes(vec![
            Keyframe::new(1.0, 2.0),
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 0.5),
        ]);
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert!((curve.evaluate(0.25) - 0.25).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 1.25).abs() < 1e-6);
        assert_eq!(curve.evaluate(3.0), 2.0);
    }

    #[test]
    fn test_empty_keyframes_evaluate_to_zero() {
        assert_eq!(Curve::Keyframes(Vec::new()).evaluate(0.5), 0.0);
    }
}
