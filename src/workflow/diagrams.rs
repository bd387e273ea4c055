use crate::config::FadeConfig;
use crate::motion::{compute_timeline, flow_dot_timeline, FlowPath, Point, QuadBezier, Timeline};
use clap::ValueEnum;
use std::time::Duration;

/// The step diagrams shown on the landing page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum DiagramKind {
    /// Browser to DuckDB query path.
    Duckdb,
    /// Retrieval augmented generation round trip.
    Rag,
    /// Three sources converging into the warehouse.
    Ingestion,
    /// Agent loop.
    Agent,
    /// Notebook cells executing in turn.
    Notebook,
}

/// A box that lights up during its step of the cycle.
#[derive(Clone, Debug)]
pub(crate) struct DiagramNode {
    pub label: &'static str,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    timeline: Timeline,
}

impl DiagramNode {
    fn new(label: &'static str, (x, y, w, h): (f32, f32, f32, f32), step: (usize, usize), fade: &FadeConfig) -> Self {
        Self { label, x, y, w, h, timeline: compute_timeline(step.0, step.1, fade) }
    }

    /// Highlight level at a point in the repeating cycle.
    pub(crate) fn intensity(&self, elapsed: Duration, cycle: Duration) -> f32 {
        self.timeline.sample_at(elapsed, cycle)
    }
}

/// A dot looping along a path, starting after `delay` and repeating every `duration`.
#[derive(Clone, Debug)]
pub(crate) struct Flow {
    pub path: FlowPath,
    pub delay: Duration,
    pub duration: Duration,
}

impl Flow {
    fn line(from: (f32, f32), to: (f32, f32), delay: f32, duration: f32) -> Self {
        Self {
            path: FlowPath::Line(Point::new(from.0, from.1), Point::new(to.0, to.1)),
            delay: Duration::from_secs_f32(delay),
            duration: Duration::from_secs_f32(duration),
        }
    }

    fn quad(from: (f32, f32), control: (f32, f32), to: (f32, f32), delay: f32, duration: f32) -> Self {
        let curve = QuadBezier {
            p0: Point::new(from.0, from.1),
            control: Point::new(control.0, control.1),
            p2: Point::new(to.0, to.1),
        };
        Self {
            path: FlowPath::Quad(curve),
            delay: Duration::from_secs_f32(delay),
            duration: Duration::from_secs_f32(duration),
        }
    }
}

/// Where a flow's dot is and how visible it is; `None` before the flow has begun.
pub(crate) fn flow_dot(flow: &Flow, opacity: &Timeline, elapsed: Duration) -> Option<(Point, f32)> {
    let since_start = elapsed.checked_sub(flow.delay)?;
    let period = flow.duration.as_millis().max(1);
    let t = (since_start.as_millis() % period) as f32 / period as f32;
    Some((flow.path.point_at(t), opacity.sample(t)))
}

#[derive(Clone, Debug)]
pub(crate) struct Diagram {
    pub kind: DiagramKind,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<DiagramNode>,
    pub flows: Vec<Flow>,
    dot_opacity: Timeline,
}

impl Diagram {
    pub(crate) fn build(kind: DiagramKind, fade: &FadeConfig) -> Self {
        let (width, height, nodes, flows) = match kind {
            DiagramKind::Duckdb => (
                440.0,
                120.0,
                vec![
                    DiagramNode::new("Browser", (10.0, 30.0, 70.0, 60.0), (0, 4), fade),
                    DiagramNode::new("Express", (125.0, 30.0, 70.0, 60.0), (1, 4), fade),
                    DiagramNode::new("Node.js", (240.0, 30.0, 70.0, 60.0), (2, 4), fade),
                    DiagramNode::new("DuckDB", (355.0, 30.0, 70.0, 60.0), (3, 4), fade),
                ],
                vec![
                    Flow::line((80.0, 60.0), (120.0, 60.0), 0.0, 2.0),
                    Flow::line((195.0, 60.0), (235.0, 60.0), 2.0, 2.0),
                    Flow::line((310.0, 60.0), (350.0, 60.0), 4.0, 2.0),
                ],
            ),
            DiagramKind::Rag => (
                500.0,
                180.0,
                vec![
                    DiagramNode::new("User", (10.0, 20.0, 65.0, 55.0), (0, 6), fade),
                    DiagramNode::new("Proxy", (105.0, 20.0, 65.0, 55.0), (1, 6), fade),
                    DiagramNode::new("Embed", (200.0, 20.0, 65.0, 55.0), (2, 6), fade),
                    DiagramNode::new("Vector", (295.0, 20.0, 65.0, 55.0), (3, 6), fade),
                    DiagramNode::new("LLM", (390.0, 20.0, 65.0, 55.0), (4, 6), fade),
                    DiagramNode::new("Response", (105.0, 110.0, 350.0, 45.0), (5, 6), fade),
                ],
                vec![
                    Flow::line((75.0, 47.5), (100.0, 47.5), 0.0, 1.3),
                    Flow::line((170.0, 47.5), (195.0, 47.5), 1.3, 1.3),
                    Flow::line((265.0, 47.5), (290.0, 47.5), 2.6, 1.3),
                    Flow::line((360.0, 47.5), (385.0, 47.5), 3.9, 1.3),
                    Flow::line((422.0, 75.0), (422.0, 105.0), 5.2, 1.3),
                ],
            ),
            DiagramKind::Ingestion => (
                500.0,
                240.0,
                vec![
                    DiagramNode::new("S3 Buckets", (10.0, 20.0, 75.0, 55.0), (0, 4), fade),
                    DiagramNode::new("SQL DBs", (10.0, 90.0, 75.0, 55.0), (0, 4), fade),
                    DiagramNode::new("Live Stream", (10.0, 160.0, 75.0, 55.0), (0, 4), fade),
                    DiagramNode::new("Unified", (180.0, 90.0, 85.0, 55.0), (1, 4), fade),
                    DiagramNode::new("Validate", (305.0, 90.0, 80.0, 55.0), (2, 4), fade),
                    DiagramNode::new("Warehouse", (425.0, 90.0, 70.0, 55.0), (3, 4), fade),
                ],
                vec![
                    Flow::quad((85.0, 47.5), (150.0, 47.5), (175.0, 117.5), 0.0, 2.0),
                    Flow::line((85.0, 117.5), (175.0, 117.5), 0.5, 1.5),
                    Flow::quad((85.0, 187.5), (150.0, 187.5), (175.0, 117.5), 1.0, 2.0),
                    Flow::line((265.0, 117.5), (300.0, 117.5), 2.0, 2.0),
                    Flow::line((385.0, 117.5), (420.0, 117.5), 4.0, 2.0),
                ],
            ),
            DiagramKind::Agent => {
                let labels = ["Trigger", "Search", "Think", "Action", "Persist"];
                let total = labels.len();
                let nodes: Vec<DiagramNode> = labels
                    .into_iter()
                    .enumerate()
                    .map(|(i, label)| {
                        DiagramNode::new(label, (10.0 + i as f32 * 105.0, 40.0, 85.0, 65.0), (i, total), fade)
                    })
                    .collect();
                let flows: Vec<Flow> = (0..total - 1)
                    .map(|i| {
                        let from_x = 10.0 + i as f32 * 105.0 + 85.0;
                        let to_x = 10.0 + (i + 1) as f32 * 105.0;
                        Flow::line((from_x, 72.5), (to_x, 72.5), i as f32 * 1.6, 1.6)
                    })
                    .collect();
                (540.0, 180.0, nodes, flows)
            }
            DiagramKind::Notebook => (
                600.0,
                240.0,
                vec![
                    DiagramNode::new("import duckdb", (30.0, 30.0, 540.0, 45.0), (0, 3), fade),
                    DiagramNode::new("conn.execute(...)", (30.0, 90.0, 540.0, 45.0), (1, 3), fade),
                    DiagramNode::new("Output", (30.0, 150.0, 540.0, 65.0), (2, 3), fade),
                ],
                Vec::new(),
            ),
        };
        Self { kind, width, height, nodes, flows, dot_opacity: flow_dot_timeline() }
    }

    /// Every flow dot currently on screen.
    pub(crate) fn flow_dots(&self, elapsed: Duration) -> Vec<(Point, f32)> {
        self.flows.iter().filter_map(|flow| flow_dot(flow, &self.dot_opacity, elapsed)).collect()
    }
}
