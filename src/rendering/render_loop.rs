use std::time::{Duration, Instant};

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Timing handed to each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    pub delta: f32,
    pub elapsed: f32,
}

/// Delta clock that can be paused. Restarting resets the reference instant,
/// so time spent stopped never shows up in a delta.
#[derive(Debug, Default)]
pub struct Clock {
    last: Option<Instant>,
}

impl Clock {
    pub fn start(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.last = None;
    }

    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }

    pub fn delta(&mut self, now: Instant) -> f32 {
        let Some(last) = self.last else {
            return 0.0;
        };
        self.last = Some(now);
        now.saturating_duration_since(last).as_secs_f32()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopTransition {
    Started,
    Stopped,
    Unchanged,
}

/// Decides when frames run.
///
/// Frames run only while the viewport intersects the window and the window is
/// visible. The shell requests a redraw on [`LoopTransition::Started`] and after
/// every frame; [`RenderLoop::begin_frame`] refuses redraws that arrive after the
/// loop stopped.
#[derive(Debug)]
pub struct RenderLoop {
    intersecting: bool,
    page_visible: bool,
    running: bool,
    clock: Clock,
    frame: FrameState,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            intersecting: false,
            page_visible: true,
            running: false,
            clock: Clock::default(),
            frame: FrameState::default(),
            frames: 0,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.intersecting && self.page_visible
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    pub fn set_intersecting(&mut self, intersecting: bool, now: Instant) -> LoopTransition {
        self.intersecting = intersecting;
        self.sync(now)
    }

    pub fn set_page_visible(&mut self, visible: bool, now: Instant) -> LoopTransition {
        self.page_visible = visible;
        self.sync(now)
    }

    /// Stops unconditionally, regardless of eligibility.
    pub fn stop(&mut self) -> LoopTransition {
        if !self.running {
            return LoopTransition::Unchanged;
        }
        self.running = false;
        self.clock.stop();
        log::debug!("Animation stopped after {} frames", self.frames);
        LoopTransition::Stopped
    }

    /// Advances the clock for a redraw. `None` means the loop is stopped and the
    /// redraw must not tick.
    pub fn begin_frame(&mut self, now: Instant) -> Option<FrameState> {
        if !self.running {
            return None;
        }
        self.frame.delta = self.clock.delta(now);
        self.frame.elapsed += self.frame.delta;
        self.frames += 1;
        Some(self.frame)
    }

    fn sync(&mut self, now: Instant) -> LoopTransition {
        match (self.is_eligible(), self.running) {
            (true, false) => {
                self.running = true;
                self.clock.start(now);
                log::debug!("Animation started");
                LoopTransition::Started
            }
            (false, true) => self.stop(),
            _ => LoopTransition::Unchanged,
        }
    }
}

/// Collapses bursts of resize signals into one resize, [`RESIZE_DEBOUNCE`]
/// after the last signal.
#[derive(Debug, Default)]
pub struct ResizeDebouncer {
    deadline: Option<Instant>,
}

impl ResizeDebouncer {
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + RESIZE_DEBOUNCE);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true once when the pending deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
