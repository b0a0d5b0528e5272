// The per-frame pipeline: acquire -> cover geometry -> draw -> filter -> reschedule.
// Visual: one call to `tick` puts one new (possibly filtered) frame on the canvas.
//
// `RenderLoop` is the session object. It owns the mode cycle, the active
// filter policy and the frame scheduler; the shell owns the source and the
// surface and hands them in each tick. `tick` takes `&mut self`, so two ticks
// can never overlap.

use tracing::{debug, error, info, warn};

use crate::compositor::cover_rect;
use crate::error::Result;
use crate::filter::{filter_pixels, FilterMode, FilterPolicy, PolicyKind};
use crate::mode::{ModeChanged, ModeCycle, ModeSet};
use crate::source::VideoSource;
use crate::surface::DisplaySurface;

/// Identifier of a scheduled frame, like an animation-frame request id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest(u64);

/// Holds at most one pending frame request. Cancelling clears it; requesting
/// while one is pending returns the existing request instead of a second one.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Option<FrameRequest>,
    next_id: u64,
}

impl Scheduler {
    pub fn request(&mut self) -> FrameRequest {
        if let Some(req) = self.pending {
            return req;
        }
        self.next_id += 1;
        let req = FrameRequest(self.next_id);
        self.pending = Some(req);
        req
    }

    pub fn cancel(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Not started yet, or stopped (e.g. while the camera is being switched).
    Stopped,
    Running,
    /// Paused by the user.
    Paused,
    /// The window isn't visible; resumes by itself when it is again.
    Hidden,
    /// No frames can be produced; carries the reason.
    Failed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frame was requested (paused, hidden, stopped or failed).
    Idle,
    /// Drawn in a pass-through mode.
    Drawn,
    /// Drawn and filtered.
    Filtered,
    /// Drawn, but the surface readback/write-back failed; the composite stays unfiltered.
    Unfiltered,
    /// The source or the draw failed for this frame only; nothing new on the canvas.
    Dropped,
    /// This tick ended the session.
    Failed,
}

#[derive(Clone, Copy, Debug)]
pub struct LoopSettings {
    pub modes: ModeSet,
    pub policy: PolicyKind,
    pub intensity: f32,
    /// Consecutive per-frame source failures tolerated before the session fails.
    pub max_frame_failures: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            modes: ModeSet::default(),
            policy: PolicyKind::default(),
            intensity: PolicyKind::default().default_intensity(),
            max_frame_failures: 30,
        }
    }
}

pub struct RenderLoop {
    modes: ModeCycle,
    policy_kind: PolicyKind,
    intensity: f32,
    policy: Box<dyn FilterPolicy>,
    scheduler: Scheduler,
    started: bool,
    paused: bool,
    visible: bool,
    failure: Option<String>,
    frame_failures: u32,
    max_frame_failures: u32,
    frames: u64,
}

impl RenderLoop {
    pub fn new(settings: LoopSettings) -> Self {
        let intensity = settings.policy.clamp_intensity(settings.intensity);
        Self {
            modes: ModeCycle::new(settings.modes),
            policy_kind: settings.policy,
            intensity,
            policy: settings.policy.build(intensity),
            scheduler: Scheduler::default(),
            started: false,
            paused: false,
            visible: true,
            failure: None,
            frame_failures: 0,
            max_frame_failures: settings.max_frame_failures.max(1),
            frames: 0,
        }
    }

    /* ---------- lifecycle ---------- */

    /// Begin (or restart after a stop/failure) ticking. Mode and intensity are kept.
    pub fn start(&mut self) {
        self.started = true;
        self.failure = None;
        self.frame_failures = 0;
        self.reschedule();
        info!(mode = self.current_mode().label(), policy = self.policy.name(), "render loop started");
    }

    /// Stop ticking and release the source. Safe to call repeatedly.
    pub fn stop<S: VideoSource + ?Sized>(&mut self, source: &mut S) {
        self.scheduler.cancel();
        self.started = false;
        source.stop();
    }

    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.scheduler.cancel();
        info!("paused");
    }

    /// Clears any stale request and schedules exactly one fresh frame.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.reschedule();
        info!("resumed");
    }

    pub fn toggle_pause(&mut self) {
        if self.paused { self.resume() } else { self.pause() }
    }

    /// Hidden windows don't tick; becoming visible again resumes unless the user paused.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.reschedule();
        } else {
            self.scheduler.cancel();
        }
        debug!(visible, "visibility changed");
    }

    /// Put the session into the failed state; no more ticks until `start`.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        error!(%reason, "render loop failed");
        self.scheduler.cancel();
        self.failure = Some(reason);
    }

    pub fn state(&self) -> SessionState {
        if let Some(reason) = &self.failure {
            SessionState::Failed(reason.clone())
        } else if !self.started {
            SessionState::Stopped
        } else if self.paused {
            SessionState::Paused
        } else if !self.visible {
            SessionState::Hidden
        } else {
            SessionState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Drop the stale token, then request one frame if we should be ticking.
    fn reschedule(&mut self) {
        self.scheduler.cancel();
        if self.is_running() {
            self.scheduler.request();
        }
    }

    /* ---------- modes & filter settings ---------- */

    pub fn current_mode(&self) -> FilterMode {
        self.modes.current()
    }

    pub fn modes(&self) -> &ModeCycle {
        &self.modes
    }

    pub fn advance_mode(&mut self, delta: i64) -> ModeChanged {
        self.modes.advance(delta)
    }

    pub fn select_mode(&mut self, index: usize) -> ModeChanged {
        self.modes.select(index)
    }

    pub fn set_mode(&mut self, mode: FilterMode) -> Option<ModeChanged> {
        self.modes.set_mode(mode)
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy_kind
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Set the intensity, clamped to the policy's range. Returns the value in effect.
    pub fn set_intensity(&mut self, value: f32) -> f32 {
        self.intensity = self.policy_kind.clamp_intensity(value);
        self.policy = self.policy_kind.build(self.intensity);
        self.intensity
    }

    pub fn adjust_intensity(&mut self, delta: f32) -> f32 {
        self.set_intensity(self.intensity + delta)
    }

    pub fn set_policy(&mut self, kind: PolicyKind) {
        self.policy_kind = kind;
        self.set_intensity(self.intensity);
    }

    /* ---------- the tick ---------- */

    /// Run one frame if one was requested.
    pub fn tick<S, D>(&mut self, source: &mut S, surface: &mut D) -> TickOutcome
    where
        S: VideoSource + ?Sized,
        D: DisplaySurface + ?Sized,
    {
        if self.scheduler.cancel().is_none() {
            return TickOutcome::Idle;
        }

        // 1) Acquire
        let frame = match source.next_frame() {
            Ok(frame) => {
                self.frame_failures = 0;
                frame
            }
            Err(err) if err.is_per_frame() => {
                self.frame_failures += 1;
                if self.frame_failures >= self.max_frame_failures {
                    self.fail(format!("{} consecutive frame failures, last: {err}", self.frame_failures));
                    return TickOutcome::Failed;
                }
                warn!(error = %err, failures = self.frame_failures, "dropping frame");
                self.reschedule();
                return TickOutcome::Dropped;
            }
            Err(err) => {
                self.fail(err.to_string());
                return TickOutcome::Failed;
            }
        };

        // 2) Geometry, 3) draw
        let (dw, dh) = surface.size();
        let rect = cover_rect(frame.width as u32, frame.height as u32, dw as u32, dh as u32);
        if let Err(err) = surface.draw_image(&frame, rect) {
            warn!(error = %err, "draw failed, dropping frame");
            self.reschedule();
            return TickOutcome::Dropped;
        }

        // 4) Filter through readback
        let mode = self.modes.current();
        let outcome = if !mode.filters() {
            TickOutcome::Drawn
        } else {
            match self.filter_surface(surface, mode) {
                Ok(()) => TickOutcome::Filtered,
                Err(err) => {
                    warn!(error = %err, mode = mode.label(), "readback failed, showing unfiltered frame");
                    TickOutcome::Unfiltered
                }
            }
        };

        // 5) Next tick
        self.frames += 1;
        self.reschedule();
        outcome
    }

    fn filter_surface<D: DisplaySurface + ?Sized>(&self, surface: &mut D, mode: FilterMode) -> Result<()> {
        let mut pixels = surface.read_pixels()?;
        filter_pixels(&mut pixels.pixels, mode, self.policy.as_ref());
        surface.write_pixels(&pixels)
    }
}
