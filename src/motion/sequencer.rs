use crate::config::FadeConfig;
use itertools::Itertools;
use std::time::Duration;

/// A single timeline marker: a fraction of the cycle and the value held there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub(crate) const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// A piecewise linear curve over one normalized cycle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Timeline {
    keyframes: Vec<Keyframe>,
}

impl Timeline {
    /// Build a timeline from explicit markers.
    ///
    /// Markers must be non-decreasing in time and lie within `[0, 1]`.
    pub(crate) fn from_keyframes(keyframes: Vec<Keyframe>) -> Self {
        assert!(!keyframes.is_empty(), "timeline needs at least one keyframe");
        assert!(
            keyframes.iter().all(|k| (0.0..=1.0).contains(&k.time)),
            "keyframe times must lie in [0, 1]"
        );
        assert!(
            keyframes.iter().tuple_windows().all(|(a, b)| a.time <= b.time),
            "keyframe times must be non-decreasing"
        );
        Self { keyframes }
    }

    pub(crate) fn key_times(&self) -> Vec<f32> {
        self.keyframes.iter().map(|k| k.time).collect()
    }

    pub(crate) fn values(&self) -> Vec<f32> {
        self.keyframes.iter().map(|k| k.value).collect()
    }

    /// Interpolated value at a fraction of the cycle.
    pub(crate) fn sample(&self, fraction: f32) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0);
        // Last marker at or before the fraction; coincident markers resolve to the latest one.
        let index = self.keyframes.iter().rposition(|k| k.time <= fraction).unwrap_or(0);
        let current = self.keyframes[index];
        let Some(next) = self.keyframes.get(index + 1) else {
            return current.value;
        };
        let span = next.time - current.time;
        if span <= f32::EPSILON {
            return next.value;
        }
        let t = (fraction - current.time) / span;
        current.value + (next.value - current.value) * t
    }

    /// Value at a wall-clock offset into a repeating cycle.
    pub(crate) fn sample_at(&self, elapsed: Duration, cycle: Duration) -> f32 {
        let cycle_millis = cycle.as_millis().max(1);
        let into_cycle = elapsed.as_millis() % cycle_millis;
        self.sample(into_cycle as f32 / cycle_millis as f32)
    }

    /// Markers rendered the way declarative `keyTimes` attributes expect them.
    pub(crate) fn key_times_attr(&self) -> String {
        self.key_times().iter().map(|time| format!("{time:.3}")).join("; ")
    }

    pub(crate) fn values_attr(&self) -> String {
        self.values().iter().map(|value| value.to_string()).join("; ")
    }
}

/// Fade timeline for one step of a round-robin highlight cycle.
///
/// The step is bright over `[step_index / total_steps, (step_index + 1) / total_steps]`
/// with a linear ramp of `config.ramp` on either side, dim everywhere else.
pub(crate) fn compute_timeline(step_index: usize, total_steps: usize, config: &FadeConfig) -> Timeline {
    assert!(total_steps > 0, "total_steps must be positive");
    assert!(step_index < total_steps, "step {step_index} out of range for {total_steps} steps");

    let step_size = 1.0 / total_steps as f32;
    let start = step_index as f32 * step_size;
    let end = if step_index + 1 == total_steps { 1.0 } else { start + step_size };
    let ramp = config.ramp;
    let (dim, bright) = (config.dim_opacity, config.bright_opacity);

    Timeline::from_keyframes(vec![
        Keyframe::new(0.0, dim),
        Keyframe::new((start - ramp).max(0.0), dim),
        Keyframe::new(start, bright),
        Keyframe::new(end, bright),
        Keyframe::new((end + ramp).min(1.0), dim),
        Keyframe::new(1.0, dim),
    ])
}

/// Opacity curve of a dot travelling along a flow line: fade in, hold, fade out.
pub(crate) fn flow_dot_timeline() -> Timeline {
    Timeline::from_keyframes(vec![
        Keyframe::new(0.0, 0.0),
        Keyframe::new(0.1, 1.0),
        Keyframe::new(0.9, 1.0),
        Keyframe::new(1.0, 0.0),
    ])
}
