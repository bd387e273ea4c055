use super::bezier::{CubicBezier, Point};
use crate::config::ParticleConfig;

/// Opaque identity handed out when a particle spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ParticleId(u64);

/// A pulse of "data in flight" along a single edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Particle {
    pub id: ParticleId,
    /// Lifetime progress in `[0, 1)`; the particle is removed once it reaches 1.
    pub progress: f32,
}

/// The live particles of one edge, advanced on a fixed tick.
///
/// Spawning is a random draw each tick, bounded by a hard cap on the number of live particles.
#[derive(Debug)]
pub(crate) struct ParticleStream {
    particles: Vec<Particle>,
    next_id: u64,
    cap: usize,
    spawn_probability: f32,
    step: f32,
    rng: fastrand::Rng,
}

impl ParticleStream {
    pub(crate) fn new(config: &ParticleConfig, rng: fastrand::Rng) -> Self {
        Self {
            particles: Vec::with_capacity(config.cap),
            next_id: 0,
            cap: config.cap,
            spawn_probability: config.spawn_probability.clamp(0.0, 1.0),
            step: config.progress_per_tick(),
            rng,
        }
    }

    pub(crate) fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn len(&self) -> usize {
        self.particles.len()
    }

    /// Add a particle at the start of the edge, unless the stream is already at its cap.
    pub(crate) fn spawn(&mut self) -> Option<ParticleId> {
        if self.len() >= self.cap {
            return None;
        }
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.particles.push(Particle { id, progress: 0.0 });
        Some(id)
    }

    /// Move every particle forward and drop the ones that reached the end.
    pub(crate) fn advance_all(&mut self, delta: f32) {
        for particle in &mut self.particles {
            particle.progress += delta;
        }
        self.particles.retain(|p| p.progress < 1.0);
    }

    /// One fixed-period update: advance, then maybe spawn.
    pub(crate) fn tick(&mut self) -> Option<ParticleId> {
        self.advance_all(self.step);
        if self.rng.f32() < self.spawn_probability {
            self.spawn()
        } else {
            None
        }
    }
}

pub(crate) fn position_of(particle: &Particle, curve: &CubicBezier) -> Point {
    curve.point_at(particle.progress)
}

/// Triangular envelope peaking halfway along the edge.
pub(crate) fn opacity_of(particle: &Particle) -> f32 {
    opacity_at(particle.progress)
}

pub(crate) fn opacity_at(progress: f32) -> f32 {
    (1.0 - 2.0 * (progress - 0.5).abs()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(cap: usize, spawn_probability: f32) -> ParticleConfig {
        ParticleConfig { cap, spawn_probability, tick_millis: 30, traversal_millis: 750 }
    }

    fn particle(progress: f32) -> Particle {
        Particle { id: ParticleId(0), progress }
    }

    #[test]
    fn spawn_respects_cap() {
        let mut stream = ParticleStream::new(&config(2, 1.0), fastrand::Rng::with_seed(1));
        let first = stream.spawn().expect("first spawn");
        let second = stream.spawn().expect("second spawn");
        assert_ne!(first, second);
        assert_eq!(stream.spawn(), None);
        assert_eq!(stream.len(), 2);
    }

    #[rstest]
    #[case(1, 1.0)]
    #[case(2, 0.6)]
    #[case(2, 1.0)]
    #[case(5, 0.3)]
    fn ticks_never_exceed_cap(#[case] cap: usize, #[case] probability: f32) {
        for seed in 0..20 {
            let mut stream = ParticleStream::new(&config(cap, probability), fastrand::Rng::with_seed(seed));
            for _ in 0..500 {
                stream.tick();
                assert!(stream.len() <= cap);
                assert!(stream.particles().iter().all(|p| (0.0..1.0).contains(&p.progress)));
            }
        }
    }

    #[test]
    fn particles_expire_after_traversal() {
        let mut stream = ParticleStream::new(&config(2, 0.0), fastrand::Rng::with_seed(7));
        stream.spawn();
        for _ in 0..3 {
            stream.advance_all(0.25);
        }
        assert_eq!(stream.len(), 1);
        stream.advance_all(0.25);
        assert_eq!(stream.len(), 0);
    }

    #[test]
    fn zero_probability_never_spawns() {
        let mut stream = ParticleStream::new(&config(2, 0.0), fastrand::Rng::with_seed(3));
        for _ in 0..100 {
            assert_eq!(stream.tick(), None);
        }
        assert_eq!(stream.len(), 0);
    }

    #[test]
    fn ids_are_unique_over_time() {
        let mut stream = ParticleStream::new(&config(2, 1.0), fastrand::Rng::with_seed(11));
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            if let Some(id) = stream.tick() {
                assert!(seen.insert(id));
            }
        }
        assert!(seen.len() > 2);
    }

    #[test]
    fn position_follows_curve_endpoints() {
        let curve = CubicBezier::s_curve(Point::new(110.0, 100.0), Point::new(135.0, 100.0));
        assert_eq!(position_of(&particle(0.0), &curve), curve.p0);
        assert_eq!(position_of(&particle(1.0), &curve), curve.p3);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 0.0)]
    #[case(0.5, 1.0)]
    #[case(0.25, 0.5)]
    #[case(0.75, 0.5)]
    fn opacity_envelope(#[case] progress: f32, #[case] expected: f32) {
        assert!((opacity_of(&particle(progress)) - expected).abs() < 1e-6);
    }

    #[test]
    fn opacity_is_monotonic_on_each_half() {
        let samples: Vec<f32> = (0..=100).map(|i| opacity_at(i as f32 / 100.0)).collect();
        assert!(samples[..=50].windows(2).all(|w| w[0] <= w[1]));
        assert!(samples[50..].windows(2).all(|w| w[0] >= w[1]));
    }
}
