mod canvas;
mod scene;

pub(crate) use scene::{DiagramScene, Scene, WorkflowScene};

use self::canvas::{palette, Canvas, Rgb, Viewport};
use crate::config::RevealConfig;
use crate::motion::{visible_fraction, RevealObserver};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Rows above the scene, holding its title.
const SCENE_TOP: u16 = 2;

const WAITING_PROMPT: &str = "make the terminal taller to start";

/// The state of a pollable after it was polled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PollableState {
    Unmodified,
    Modified,
    Done,
}

/// Something that changes over time and must be polled to find out.
pub(crate) trait Pollable {
    fn poll(&mut self) -> PollableState;
}

/// Paces the preview: reports a new frame every tick until the run time is over.
#[derive(Debug)]
pub(crate) struct FrameClock {
    tick: Duration,
    run_for: Option<Duration>,
    start: Option<Instant>,
    last_frame: Option<Instant>,
    delta: Duration,
    completed: bool,
}

impl FrameClock {
    pub(crate) fn new(tick: Duration, run_for: Option<Duration>) -> Self {
        Self { tick, run_for, start: None, last_frame: None, delta: Duration::ZERO, completed: false }
    }

    /// Time between the last two frames.
    pub(crate) fn delta(&self) -> Duration {
        self.delta
    }

    /// How long to wait for input before the next frame is due.
    pub(crate) fn until_next(&self, now: Instant) -> Duration {
        match self.last_frame {
            Some(last) => self.tick.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    pub(crate) fn poll_at(&mut self, now: Instant) -> PollableState {
        let Some(start) = self.start else {
            self.start = Some(now);
            self.last_frame = Some(now);
            return PollableState::Modified;
        };

        if let Some(run_for) = self.run_for {
            if now.saturating_duration_since(start) >= run_for {
                if !self.completed {
                    self.completed = true;
                    return PollableState::Done;
                }
                return PollableState::Unmodified;
            }
        }

        let last = self.last_frame.unwrap_or(start);
        let since = now.saturating_duration_since(last);
        if since < self.tick {
            return PollableState::Unmodified;
        }
        self.last_frame = Some(now);
        self.delta = since;
        PollableState::Modified
    }
}

impl Pollable for FrameClock {
    fn poll(&mut self) -> PollableState {
        self.poll_at(Instant::now())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    #[error("terminal: {0}")]
    Terminal(#[from] io::Error),

    #[error("terminal is too small: {0}x{1}")]
    TooSmall(u16, u16),
}

/// Raw mode plus the alternate screen, undone on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter<W: Write>(output: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(output, EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Options for a preview run.
#[derive(Clone, Debug)]
pub(crate) struct PreviewOptions {
    pub tick: Duration,
    pub run_for: Option<Duration>,
    pub reveal: RevealConfig,
}

/// Animate a scene in the terminal until a key is pressed or the run time is over.
///
/// Nothing moves until enough of the scene fits on screen; after that the scene fades in and
/// keeps animating even if the terminal shrinks again.
pub(crate) fn run<S: Scene>(scene: &mut S, options: &PreviewOptions) -> Result<(), PreviewError> {
    let (columns, rows) = terminal::size()?;
    if columns < 20 || rows < SCENE_TOP + 2 {
        return Err(PreviewError::TooSmall(columns, rows));
    }

    let mut stdout = io::stdout();
    let _guard = TerminalGuard::enter(&mut stdout)?;

    let title = scene.title();
    let mut observer = RevealObserver::new(options.reveal.threshold);
    observer.on_enter_viewport(move || info!("{title} entered the viewport"));

    let mut clock = FrameClock::new(options.tick, options.run_for);
    loop {
        match clock.poll() {
            PollableState::Done => break,
            PollableState::Unmodified => (),
            PollableState::Modified => {
                let size = terminal::size()?;
                let canvas = render_frame(scene, &mut observer, size, clock.delta(), Instant::now(), options);
                present(&mut stdout, &canvas)?;
            }
        }

        if event::poll(clock.until_next(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    debug!("key pressed, leaving preview");
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Lay out one frame for a terminal of `columns` x `rows`; the scene only advances once revealed.
fn render_frame<S: Scene>(
    scene: &mut S,
    observer: &mut RevealObserver,
    (columns, rows): (u16, u16),
    delta: Duration,
    now: Instant,
    options: &PreviewOptions,
) -> Canvas {
    let (view_width, view_height) = scene.view_box();
    let viewport = Viewport::fit(view_width, 1, SCENE_TOP, columns.saturating_sub(2));
    let scene_rows = viewport.rows_for(view_height) + scene.footer_rows() as f32;
    observer.observe(visible_fraction(SCENE_TOP as f32, scene_rows, rows as f32), now);

    let mut canvas = Canvas::new(columns, rows);
    canvas.text(1, 0, &scene.title(), palette::TEXT);
    if observer.is_revealed() {
        scene.advance(delta);
        scene.draw(&mut canvas, &viewport, observer.reveal_progress(now, options.reveal.fade()));
    } else {
        canvas.text(1, SCENE_TOP as i32, WAITING_PROMPT, palette::MUTED_TEXT);
    }
    canvas
}

fn present<W: Write>(output: &mut W, canvas: &Canvas) -> io::Result<()> {
    let mut current: Option<Rgb> = None;
    for (row, cells) in canvas.rows().enumerate() {
        queue!(output, MoveTo(0, row as u16))?;
        for cell in cells {
            if current != Some(cell.color) {
                let Rgb { r, g, b } = cell.color;
                queue!(output, SetForegroundColor(Color::Rgb { r, g, b }))?;
                current = Some(cell.color);
            }
            queue!(output, Print(cell.ch))?;
        }
    }
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// A scene 100 x 400 units that records what the frame loop asked of it.
    #[derive(Default)]
    struct RecordingScene {
        advanced: Duration,
        alpha: Cell<Option<f32>>,
    }

    impl Scene for RecordingScene {
        fn title(&self) -> String {
            "recording".to_string()
        }

        fn view_box(&self) -> (f32, f32) {
            (100.0, 400.0)
        }

        fn advance(&mut self, delta: Duration) {
            self.advanced += delta;
        }

        fn draw(&self, _canvas: &mut Canvas, _viewport: &Viewport, alpha: f32) {
            self.alpha.set(Some(alpha));
        }
    }

    fn options() -> PreviewOptions {
        PreviewOptions { tick: Duration::from_millis(30), run_for: None, reveal: RevealConfig::default() }
    }

    fn row_text(canvas: &Canvas, row: usize) -> String {
        canvas.rows().nth(row).map(|cells| cells.iter().map(|c| c.ch).collect()).unwrap_or_default()
    }

    #[test]
    fn short_terminal_holds_the_scene() {
        let mut scene = RecordingScene::default();
        let mut observer = RevealObserver::new(RevealConfig::default().threshold);
        // 80 columns put 156 rows of scene below the title; 8 visible rows is about 5%.
        let canvas =
            render_frame(&mut scene, &mut observer, (80, 10), Duration::from_millis(30), Instant::now(), &options());

        assert!(!observer.is_revealed());
        assert_eq!(scene.advanced, Duration::ZERO);
        assert_eq!(scene.alpha.get(), None);
        assert!(row_text(&canvas, SCENE_TOP as usize).contains(WAITING_PROMPT));
    }

    #[test]
    fn tall_terminal_reveals_and_fades_in() {
        let mut scene = RecordingScene::default();
        let mut observer = RevealObserver::new(RevealConfig::default().threshold);
        let options = options();
        let start = Instant::now();
        let tick = Duration::from_millis(30);

        let canvas = render_frame(&mut scene, &mut observer, (80, 40), tick, start, &options);
        assert!(observer.is_revealed());
        assert_eq!(scene.advanced, tick);
        assert_eq!(scene.alpha.get(), Some(0.0));
        assert!(!row_text(&canvas, SCENE_TOP as usize).contains(WAITING_PROMPT));

        let later = start + options.reveal.fade();
        render_frame(&mut scene, &mut observer, (80, 40), tick, later, &options);
        assert_eq!(scene.advanced, tick * 2);
        assert_eq!(scene.alpha.get(), Some(observer.reveal_progress(later, options.reveal.fade())));
        assert_eq!(scene.alpha.get(), Some(1.0));
    }

    #[test]
    fn revealed_scene_keeps_running_after_shrinking() {
        let mut scene = RecordingScene::default();
        let mut observer = RevealObserver::new(RevealConfig::default().threshold);
        let tick = Duration::from_millis(30);
        let now = Instant::now();
        render_frame(&mut scene, &mut observer, (80, 40), tick, now, &options());
        render_frame(&mut scene, &mut observer, (80, 3), tick, now, &options());
        assert_eq!(scene.advanced, tick * 2);
    }

    #[test]
    fn first_poll_is_a_frame() {
        let mut clock = FrameClock::new(Duration::from_millis(30), None);
        assert_eq!(clock.poll_at(Instant::now()), PollableState::Modified);
        assert_eq!(clock.delta(), Duration::ZERO);
    }

    #[test]
    fn frames_follow_the_tick() {
        let start = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(30), None);
        clock.poll_at(start);
        assert_eq!(clock.poll_at(start + Duration::from_millis(10)), PollableState::Unmodified);
        assert_eq!(clock.until_next(start + Duration::from_millis(10)), Duration::from_millis(20));
        assert_eq!(clock.poll_at(start + Duration::from_millis(35)), PollableState::Modified);
        assert_eq!(clock.delta(), Duration::from_millis(35));
        assert_eq!(clock.until_next(start + Duration::from_millis(35)), Duration::from_millis(30));
    }

    #[test]
    fn done_once_after_run_time() {
        let start = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(30), Some(Duration::from_secs(1)));
        clock.poll_at(start);
        assert_eq!(clock.poll_at(start + Duration::from_secs(1)), PollableState::Done);
        assert_eq!(clock.poll_at(start + Duration::from_secs(2)), PollableState::Unmodified);
    }

    #[test]
    fn present_writes_every_cell() {
        let mut canvas = Canvas::new(3, 2);
        canvas.text(0, 1, "ok", palette::TEXT);
        let mut output = Vec::new();
        present(&mut output, &canvas).expect("present");
        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("ok"));
        assert!(text.contains("38;2;228;228;231"));
    }
}
