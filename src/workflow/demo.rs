use crate::config::{ParticleConfig, WorkflowConfig};
use crate::motion::{opacity_of, position_of, CubicBezier, Point, ParticleStream};
use std::collections::BTreeSet;
use std::time::Duration;

/// A card in the workflow pipeline.
#[derive(Debug)]
pub(crate) struct WorkflowNode {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub x: f32,
    pub y: f32,
}

/// Half the width of a node card; edges attach at the card sides.
pub(crate) const NODE_HALF_WIDTH: f32 = 50.0;

pub(crate) const VIEW_WIDTH: f32 = 650.0;
pub(crate) const VIEW_HEIGHT: f32 = 200.0;

pub(crate) const NODES: [WorkflowNode; 6] = [
    WorkflowNode { title: "Data Source", subtitle: "API", x: 60.0, y: 100.0 },
    WorkflowNode { title: "AI Analytics", subtitle: "GPT-4", x: 185.0, y: 100.0 },
    WorkflowNode { title: "Transform", subtitle: "Format", x: 310.0, y: 100.0 },
    WorkflowNode { title: "Execute", subtitle: "Run", x: 435.0, y: 100.0 },
    WorkflowNode { title: "Slack", subtitle: "Notify", x: 560.0, y: 50.0 },
    WorkflowNode { title: "Gmail", subtitle: "Send", x: 560.0, y: 150.0 },
];

/// Directed edges, as indexes into [`NODES`].
pub(crate) const CONNECTIONS: [(usize, usize); 5] = [(0, 1), (1, 2), (2, 3), (3, 4), (3, 5)];

const SEQUENCE: [usize; 6] = [0, 1, 2, 3, 4, 5];

const TERMINAL_LOGS: [(usize, &str); 10] = [
    (0, "$ Fetching data from API..."),
    (0, "  GET https://api.data.io/v1/metrics"),
    (1, "$ Running AI analysis..."),
    (1, "  Processing 2,847 records..."),
    (2, "$ Transforming data..."),
    (2, "  Formatting for output..."),
    (3, "$ Executing code block..."),
    (3, "  Generating dashboard..."),
    (4, "$ Sending notifications..."),
    (5, "  Done in 3.2s"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Status {
    Idle,
    Active,
    Done,
}

/// The bezier an edge is drawn along.
pub(crate) fn connection_curve(from: usize, to: usize) -> CubicBezier {
    let from = &NODES[from];
    let to = &NODES[to];
    CubicBezier::s_curve(
        Point::new(from.x + NODE_HALF_WIDTH, from.y),
        Point::new(to.x - NODE_HALF_WIDTH, to.y),
    )
}

/// A particle ready to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ParticleSprite {
    pub position: Point,
    pub opacity: f32,
}

/// The self-running AI workflow demo.
///
/// Every step interval the next node becomes active and the previous one completes. After the last
/// node the result card shows, the demo holds for a while and then starts over from scratch.
#[derive(Debug)]
pub(crate) struct WorkflowDemo {
    config: WorkflowConfig,
    particles: ParticleConfig,
    active_node: usize,
    completed: BTreeSet<usize>,
    visible_logs: Vec<&'static str>,
    show_result: bool,
    paused: bool,
    step: usize,
    since_step: Duration,
    result_in: Option<Duration>,
    pause_left: Option<Duration>,
    streams: Vec<Option<ParticleStream>>,
    rng: fastrand::Rng,
}

impl WorkflowDemo {
    pub(crate) fn new(config: WorkflowConfig, particles: ParticleConfig, rng: fastrand::Rng) -> Self {
        Self {
            config,
            particles,
            active_node: 0,
            completed: BTreeSet::new(),
            visible_logs: Vec::new(),
            show_result: false,
            paused: false,
            step: 0,
            since_step: Duration::ZERO,
            result_in: None,
            pause_left: None,
            streams: CONNECTIONS.iter().map(|_| None).collect(),
            rng,
        }
    }

    pub(crate) fn active_node(&self) -> usize {
        self.active_node
    }

    pub(crate) fn visible_logs(&self) -> &[&'static str] {
        &self.visible_logs
    }

    pub(crate) fn show_result(&self) -> bool {
        self.show_result
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn node_status(&self, node: usize) -> Status {
        if self.completed.contains(&node) {
            Status::Done
        } else if self.active_node == node {
            Status::Active
        } else {
            Status::Idle
        }
    }

    pub(crate) fn connection_status(&self, connection: usize) -> Status {
        let (from, to) = CONNECTIONS[connection];
        if self.completed.contains(&from) && self.completed.contains(&to) {
            Status::Done
        } else if self.completed.contains(&from) && self.active_node == to {
            Status::Active
        } else {
            Status::Idle
        }
    }

    /// Move the demo clock forward. Time left over after the result or the pause runs out carries
    /// into the next phase, so frame sizes don't shift the step cadence.
    pub(crate) fn advance(&mut self, elapsed: Duration) {
        let mut left = elapsed;
        loop {
            if let Some(remaining) = self.pause_left {
                if left < remaining {
                    self.pause_left = Some(remaining - left);
                    return;
                }
                left -= remaining;
                self.restart();
            }

            if let Some(remaining) = self.result_in {
                if left < remaining {
                    self.result_in = Some(remaining - left);
                    return;
                }
                left -= remaining;
                self.result_in = None;
                self.show_result = true;
                self.paused = true;
                self.pause_left = Some(Duration::from_millis(self.config.pause_millis));
                continue;
            }

            let interval = Duration::from_millis(self.config.step_millis.max(1));
            self.since_step += left;
            left = Duration::ZERO;
            while self.since_step >= interval {
                self.since_step -= interval;
                self.run_step();
                if self.result_in.is_some() {
                    left = std::mem::take(&mut self.since_step);
                    break;
                }
            }
            if self.result_in.is_none() {
                return;
            }
        }
    }

    /// Advance the particles on every active edge by one tick.
    pub(crate) fn tick_particles(&mut self) {
        for stream in self.streams.iter_mut().flatten() {
            stream.tick();
        }
    }

    /// Every live particle, positioned on its edge.
    pub(crate) fn particle_sprites(&self) -> Vec<ParticleSprite> {
        let mut sprites = Vec::new();
        for (index, stream) in self.streams.iter().enumerate() {
            let Some(stream) = stream else { continue };
            let (from, to) = CONNECTIONS[index];
            let curve = connection_curve(from, to);
            sprites.extend(stream.particles().iter().map(|particle| ParticleSprite {
                position: position_of(particle, &curve),
                opacity: opacity_of(particle),
            }));
        }
        sprites
    }

    fn run_step(&mut self) {
        if self.step < SEQUENCE.len() {
            self.active_node = SEQUENCE[self.step];
            if self.step > 0 {
                self.completed.insert(SEQUENCE[self.step - 1]);
            }

            let history = self.config.log_history;
            if self.visible_logs.len() > history {
                self.visible_logs.drain(..self.visible_logs.len() - history);
            }
            let step = self.step;
            self.visible_logs.extend(TERMINAL_LOGS.iter().filter(|(s, _)| *s == step).map(|(_, text)| *text));

            if self.step == SEQUENCE.len() - 1 {
                self.result_in = Some(Duration::from_millis(self.config.result_delay_millis));
            }
            self.step += 1;
        } else {
            self.clear();
            self.step = 1;
        }
        self.sync_streams();
    }

    fn restart(&mut self) {
        self.clear();
        self.paused = false;
        self.pause_left = None;
        self.step = 0;
        self.since_step = Duration::ZERO;
        self.sync_streams();
    }

    fn clear(&mut self) {
        self.completed.clear();
        self.active_node = 0;
        self.visible_logs.clear();
        self.show_result = false;
    }

    /// Edges get a particle stream while active and lose it, with all its particles, otherwise.
    fn sync_streams(&mut self) {
        for index in 0..CONNECTIONS.len() {
            let active = self.connection_status(index) == Status::Active;
            match (&self.streams[index], active) {
                (None, true) => {
                    self.streams[index] = Some(ParticleStream::new(&self.particles, self.rng.fork()));
                }
                (Some(_), false) => self.streams[index] = None,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> WorkflowDemo {
        WorkflowDemo::new(WorkflowConfig::default(), ParticleConfig::default(), fastrand::Rng::with_seed(42))
    }

    fn second() -> Duration {
        Duration::from_secs(1)
    }

    fn live_streams(demo: &WorkflowDemo) -> usize {
        demo.streams.iter().filter(|s| s.is_some()).count()
    }

    fn active_connections(demo: &WorkflowDemo) -> usize {
        (0..CONNECTIONS.len()).filter(|&i| demo.connection_status(i) == Status::Active).count()
    }

    #[test]
    fn starts_idle_on_first_node() {
        let demo = demo();
        assert_eq!(demo.active_node(), 0);
        assert_eq!(demo.node_status(0), Status::Active);
        assert_eq!(demo.node_status(1), Status::Idle);
        assert!(demo.visible_logs().is_empty());
        assert_eq!(live_streams(&demo), 0);
    }

    #[test]
    fn walks_nodes_in_order() {
        let mut demo = demo();
        for node in 0..6 {
            demo.advance(second());
            assert_eq!(demo.active_node(), node);
            assert_eq!(demo.node_status(node), Status::Active);
            for done in 0..node {
                assert_eq!(demo.node_status(done), Status::Done);
            }
            assert_eq!(live_streams(&demo), active_connections(&demo));
        }
        assert_eq!(demo.connection_status(3), Status::Done);
        assert_eq!(demo.connection_status(4), Status::Active);
        assert_eq!(demo.visible_logs().last(), Some(&"  Done in 3.2s"));
    }

    #[test]
    fn log_window_is_bounded() {
        let mut demo = demo();
        for _ in 0..5 {
            demo.advance(second());
            assert!(demo.visible_logs().len() <= WorkflowConfig::default().log_history + 2);
        }
        assert_eq!(demo.visible_logs().first(), Some(&"$ Transforming data..."));
    }

    #[test]
    fn pauses_then_restarts_clean() {
        let mut demo = demo();
        for _ in 0..6 {
            demo.advance(second());
        }
        assert!(!demo.show_result());
        demo.advance(Duration::from_millis(600));
        assert!(demo.show_result());
        assert!(demo.is_paused());

        demo.advance(Duration::from_secs(2));
        assert!(demo.is_paused());
        assert_eq!(demo.active_node(), 5);

        demo.advance(Duration::from_secs(2));
        assert!(!demo.is_paused());
        assert!(!demo.show_result());
        assert_eq!(demo.active_node(), 0);
        assert!(demo.visible_logs().is_empty());
        assert_eq!(live_streams(&demo), 0);

        demo.advance(second());
        assert_eq!(demo.visible_logs().len(), 2);
        demo.advance(second());
        assert_eq!(demo.node_status(0), Status::Done);
        assert_eq!(demo.active_node(), 1);
    }

    #[test]
    fn leftover_time_carries_across_result_and_pause() {
        let mut demo = demo();
        // Six steps plus 250ms already counting toward the result card.
        demo.advance(Duration::from_millis(6250));
        assert_eq!(demo.active_node(), 5);
        assert!(!demo.show_result());

        // 350ms finishes the result delay, 4000ms the pause, 400ms goes to the next step.
        demo.advance(Duration::from_millis(4750));
        assert!(!demo.is_paused());
        assert_eq!(demo.active_node(), 0);
        assert!(demo.visible_logs().is_empty());

        demo.advance(Duration::from_millis(599));
        assert!(demo.visible_logs().is_empty());
        demo.advance(Duration::from_millis(1));
        assert_eq!(demo.visible_logs().first(), Some(&"$ Fetching data from API..."));
    }

    #[test]
    fn uneven_frames_keep_the_cadence() {
        let mut demo = demo();
        let frames = [7u64, 33, 16, 48, 29, 12, 61];
        let mut elapsed = 0;
        let mut frame = 0;
        // One full cycle is 6000 + 600 + 4000ms; stop 1000ms into the next one.
        while elapsed + frames[frame % frames.len()] <= 11_600 {
            let step = frames[frame % frames.len()];
            demo.advance(Duration::from_millis(step));
            elapsed += step;
            frame += 1;
        }
        demo.advance(Duration::from_millis(11_600 - elapsed));
        assert_eq!(demo.active_node(), 0);
        assert_eq!(demo.visible_logs().len(), 2);
        assert!(!demo.show_result());
    }

    #[test]
    fn small_ticks_match_whole_steps() {
        let mut demo = demo();
        for _ in 0..100 {
            demo.advance(Duration::from_millis(30));
        }
        // 3000ms elapsed: three steps have run.
        assert_eq!(demo.active_node(), 2);
    }

    #[test]
    fn particles_only_on_active_edges() {
        let mut demo = demo();
        demo.advance(second());
        demo.advance(second());
        for _ in 0..200 {
            demo.tick_particles();
            let sprites = demo.particle_sprites();
            assert!(sprites.len() <= ParticleConfig::default().cap);
            for sprite in sprites {
                assert!((0.0..=1.0).contains(&sprite.opacity));
                assert!(sprite.position.x >= 110.0 && sprite.position.x <= 135.0);
            }
        }
    }

    #[test]
    fn connection_curves_attach_to_card_sides() {
        let curve = connection_curve(3, 4);
        assert_eq!(curve.p0, Point::new(485.0, 100.0));
        assert_eq!(curve.p3, Point::new(510.0, 50.0));
    }
}
