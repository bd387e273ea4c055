use std::fmt;
use std::time::{Duration, Instant};

type RevealCallback = Box<dyn FnOnce()>;

enum RevealState {
    Watching,
    Revealed(Instant),
}

/// One-shot boundary detector: signals the first time an element's visible share reaches the
/// threshold, then disconnects and ignores every later observation.
pub(crate) struct RevealObserver {
    threshold: f32,
    state: RevealState,
    callback: Option<RevealCallback>,
}

impl fmt::Debug for RevealObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealObserver")
            .field("threshold", &self.threshold)
            .field("revealed", &self.is_revealed())
            .finish()
    }
}

impl RevealObserver {
    pub(crate) fn new(threshold: f32) -> Self {
        Self { threshold: threshold.clamp(0.0, 1.0), state: RevealState::Watching, callback: None }
    }

    /// Register the callback fired on the first crossing. Replaces any previous one.
    pub(crate) fn on_enter_viewport<F>(&mut self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        if matches!(self.state, RevealState::Watching) {
            self.callback = Some(Box::new(callback));
        }
    }

    pub(crate) fn is_revealed(&self) -> bool {
        matches!(self.state, RevealState::Revealed(_))
    }

    /// Feed the current visible fraction. Returns true only on the observation that reveals.
    pub(crate) fn observe(&mut self, visible_fraction: f32, now: Instant) -> bool {
        if self.is_revealed() {
            return false;
        }
        if visible_fraction <= 0.0 || visible_fraction < self.threshold {
            return false;
        }
        self.state = RevealState::Revealed(now);
        if let Some(callback) = self.callback.take() {
            callback();
        }
        true
    }

    /// Ease-out progress of the fade-in that follows the reveal, 0 before it.
    pub(crate) fn reveal_progress(&self, now: Instant, fade: Duration) -> f32 {
        let RevealState::Revealed(at) = self.state else {
            return 0.0;
        };
        if fade.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(at).as_secs_f32();
        let t = (elapsed / fade.as_secs_f32()).min(1.0);
        let omt = 1.0 - t;
        1.0 - omt * omt * omt
    }
}

/// Share of an element of `height` starting at `top` that fits inside `[0, viewport_height)`.
pub(crate) fn visible_fraction(top: f32, height: f32, viewport_height: f32) -> f32 {
    if height <= 0.0 {
        return 0.0;
    }
    let visible_top = top.max(0.0);
    let visible_bottom = (top + height).min(viewport_height);
    ((visible_bottom - visible_top) / height).clamp(0.0, 1.0)
}
