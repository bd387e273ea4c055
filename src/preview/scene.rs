use super::canvas::{palette, Canvas, Rgb, Viewport};
use crate::config::{AnimationConfig, FadeConfig, ParticleConfig, WorkflowConfig};
use crate::motion::Point;
use crate::workflow::{
    connection_curve, Diagram, DiagramKind, Status, WorkflowDemo, CONNECTIONS, NODES, NODE_HALF_WIDTH, VIEW_HEIGHT,
    VIEW_WIDTH,
};
use std::time::Duration;

const CARD_HALF_HEIGHT: f32 = 30.0;

/// Something the preview loop can animate.
pub(crate) trait Scene {
    fn title(&self) -> String;

    /// Width and height of the view box, in diagram units.
    fn view_box(&self) -> (f32, f32);

    /// Rows drawn below the view box.
    fn footer_rows(&self) -> u16 {
        0
    }

    fn advance(&mut self, delta: Duration);

    /// Draw the current frame; `alpha` fades the whole scene in from the background.
    fn draw(&self, canvas: &mut Canvas, viewport: &Viewport, alpha: f32);
}

fn faded(color: Rgb, alpha: f32) -> Rgb {
    palette::BACKGROUND.mix(color, alpha)
}

/// One of the looping step diagrams.
pub(crate) struct DiagramScene {
    diagram: Diagram,
    cycle: Duration,
    fade: FadeConfig,
    elapsed: Duration,
}

impl DiagramScene {
    pub(crate) fn new(kind: DiagramKind, animation: &AnimationConfig) -> Self {
        let fade = animation.fade();
        Self { diagram: Diagram::build(kind, &fade), cycle: animation.cycle(), fade, elapsed: Duration::ZERO }
    }

    /// How lit a node is, normalized so dim is 0 and bright is 1.
    fn highlight(&self, intensity: f32) -> f32 {
        let span = self.fade.bright_opacity - self.fade.dim_opacity;
        if span <= f32::EPSILON {
            return 1.0;
        }
        ((intensity - self.fade.dim_opacity) / span).clamp(0.0, 1.0)
    }
}

impl Scene for DiagramScene {
    fn title(&self) -> String {
        format!("{} diagram", self.diagram.kind)
    }

    fn view_box(&self) -> (f32, f32) {
        (self.diagram.width, self.diagram.height)
    }

    fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
    }

    fn draw(&self, canvas: &mut Canvas, viewport: &Viewport, alpha: f32) {
        for flow in &self.diagram.flows {
            canvas.trace(viewport, |t| flow.path.point_at(t), '·', faded(palette::IDLE, alpha));
        }
        for node in &self.diagram.nodes {
            let highlight = self.highlight(node.intensity(self.elapsed, self.cycle));
            let border = faded(palette::IDLE.mix(palette::INDIGO, highlight), alpha);
            let label = faded(palette::MUTED_TEXT.mix(palette::TEXT, highlight), alpha);
            let top_left = viewport.project(Point::new(node.x, node.y));
            let bottom_right = viewport.project(Point::new(node.x + node.w, node.y + node.h));
            canvas.frame(top_left, bottom_right, border);
            let (center, row) = viewport.project(Point::new(node.x + node.w / 2.0, node.y + node.h / 2.0));
            canvas.text_centered(center, row, node.label, label);
        }
        for (position, opacity) in self.diagram.flow_dots(self.elapsed) {
            let (column, row) = viewport.project(position);
            canvas.put(column, row, '●', faded(palette::INDIGO, opacity * alpha));
        }
    }
}

/// The self-running workflow demo, with its terminal log underneath.
pub(crate) struct WorkflowScene {
    demo: WorkflowDemo,
    tick: Duration,
    since_tick: Duration,
    log_rows: u16,
}

impl WorkflowScene {
    pub(crate) fn new(workflow: WorkflowConfig, particles: ParticleConfig, rng: fastrand::Rng) -> Self {
        let log_rows = u16::try_from(workflow.log_history).unwrap_or(u16::MAX).saturating_add(2);
        let tick = particles.tick();
        Self { demo: WorkflowDemo::new(workflow, particles, rng), tick, since_tick: Duration::ZERO, log_rows }
    }

    fn status_color(status: Status) -> Rgb {
        match status {
            Status::Idle => palette::IDLE,
            Status::Active => palette::BLUE,
            Status::Done => palette::EMERALD,
        }
    }
}

impl Scene for WorkflowScene {
    fn title(&self) -> String {
        format!("workflow demo: {}", NODES[self.demo.active_node()].title)
    }

    fn view_box(&self) -> (f32, f32) {
        (VIEW_WIDTH, VIEW_HEIGHT)
    }

    fn footer_rows(&self) -> u16 {
        self.log_rows
    }

    fn advance(&mut self, delta: Duration) {
        self.demo.advance(delta);
        if self.tick.is_zero() {
            self.demo.tick_particles();
            return;
        }
        self.since_tick += delta;
        while self.since_tick >= self.tick {
            self.since_tick -= self.tick;
            self.demo.tick_particles();
        }
    }

    fn draw(&self, canvas: &mut Canvas, viewport: &Viewport, alpha: f32) {
        for (index, (from, to)) in CONNECTIONS.iter().enumerate() {
            let curve = connection_curve(*from, *to);
            let color = faded(Self::status_color(self.demo.connection_status(index)), alpha);
            canvas.trace(viewport, |t| curve.point_at(t), '·', color);
        }
        for sprite in self.demo.particle_sprites() {
            let (column, row) = viewport.project(sprite.position);
            canvas.put(column, row, '•', faded(palette::LIGHT_BLUE, sprite.opacity * alpha));
        }
        for (index, node) in NODES.iter().enumerate() {
            let status = self.demo.node_status(index);
            let top_left = viewport.project(Point::new(node.x - NODE_HALF_WIDTH, node.y - CARD_HALF_HEIGHT));
            let bottom_right = viewport.project(Point::new(node.x + NODE_HALF_WIDTH, node.y + CARD_HALF_HEIGHT));
            canvas.frame(top_left, bottom_right, faded(Self::status_color(status), alpha));

            let (center, row) = viewport.project(Point::new(node.x, node.y));
            let title = if status == Status::Idle { palette::MUTED_TEXT } else { palette::TEXT };
            canvas.text_centered(center, row - 1, node.title, faded(title, alpha));
            canvas.text_centered(center, row, node.subtitle, faded(palette::MUTED_TEXT, alpha));
        }

        let (left, bottom) = viewport.project(Point::new(0.0, VIEW_HEIGHT));
        let mut row = bottom + 1;
        for line in self.demo.visible_logs() {
            canvas.text(left, row, line, faded(palette::MUTED_TEXT, alpha));
            row += 1;
        }
        if self.demo.show_result() {
            let result = if self.demo.is_paused() { "✓ Workflow complete, restarting soon" } else { "✓ Workflow complete" };
            canvas.text(left, row, result, faded(palette::EMERALD, alpha));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn glyphs(canvas: &Canvas, glyph: char) -> usize {
        canvas.rows().flatten().filter(|cell| cell.ch == glyph).count()
    }

    #[test]
    fn diagrams_draw_their_labels() {
        for kind in DiagramKind::iter() {
            let scene = DiagramScene::new(kind, &AnimationConfig::default());
            let (width, _) = scene.view_box();
            let viewport = Viewport::fit(width, 0, 0, 120);
            let mut canvas = Canvas::new(120, 40);
            scene.draw(&mut canvas, &viewport, 1.0);
            assert!(glyphs(&canvas, '╭') > 0, "{kind} drew no boxes");
        }
    }

    #[test]
    fn first_duckdb_box_is_lit_at_cycle_start() {
        let mut scene = DiagramScene::new(DiagramKind::Duckdb, &AnimationConfig::default());
        scene.advance(Duration::from_millis(500));
        let viewport = Viewport::fit(440.0, 0, 0, 88);
        let mut canvas = Canvas::new(88, 20);
        scene.draw(&mut canvas, &viewport, 1.0);

        let (column, row) = viewport.project(Point::new(10.0, 30.0));
        let first = canvas.get(column as u16, row as u16).map(|cell| cell.color);
        let (column, row) = viewport.project(Point::new(355.0, 30.0));
        let last = canvas.get(column as u16, row as u16).map(|cell| cell.color);
        assert_eq!(first, Some(palette::INDIGO));
        assert_ne!(first, last);
    }

    #[test]
    fn zero_alpha_draws_background() {
        let scene = DiagramScene::new(DiagramKind::Rag, &AnimationConfig::default());
        let viewport = Viewport::fit(scene.view_box().0, 0, 0, 80);
        let mut canvas = Canvas::new(80, 30);
        scene.draw(&mut canvas, &viewport, 0.0);
        assert!(canvas.rows().flatten().all(|cell| cell.color == palette::BACKGROUND));
    }

    #[test]
    fn huge_log_history_saturates_footer() {
        let workflow = WorkflowConfig { log_history: usize::MAX, ..WorkflowConfig::default() };
        let scene = WorkflowScene::new(workflow, ParticleConfig::default(), fastrand::Rng::with_seed(1));
        assert_eq!(scene.footer_rows(), u16::MAX);

        let workflow = WorkflowConfig { log_history: u16::MAX as usize - 1, ..WorkflowConfig::default() };
        let scene = WorkflowScene::new(workflow, ParticleConfig::default(), fastrand::Rng::with_seed(1));
        assert_eq!(scene.footer_rows(), u16::MAX);

        let scene = WorkflowScene::new(WorkflowConfig::default(), ParticleConfig::default(), fastrand::Rng::with_seed(1));
        assert_eq!(scene.footer_rows(), 6);
    }

    #[test]
    fn workflow_scene_shows_logs() {
        let mut scene =
            WorkflowScene::new(WorkflowConfig::default(), ParticleConfig::default(), fastrand::Rng::with_seed(3));
        scene.advance(Duration::from_millis(1000));
        scene.advance(Duration::from_millis(1000));
        let viewport = Viewport::fit(VIEW_WIDTH, 0, 0, 130);
        let rows = viewport.rows_for(VIEW_HEIGHT) as u16 + scene.footer_rows() + 1;
        let mut canvas = Canvas::new(130, rows);
        scene.draw(&mut canvas, &viewport, 1.0);

        let text: String = canvas.rows().map(|cells| cells.iter().map(|c| c.ch).collect::<String>() + "\n").collect();
        assert!(text.contains("$ Fetching data from API..."), "{text}");
        assert!(glyphs(&canvas, '╭') == NODES.len());
    }
}
