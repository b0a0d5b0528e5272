// What you SEE:
// • Live camera fills the window (cropped, never letterboxed).
// • Right/Left or a horizontal mouse drag: NORMAL -> RED FILTER -> BLUE FILTER.
//   The mode name pops up for a moment after each change.
// • Up/Down: filter intensity. Z/X: camera zoom (if supported).
// • C captures a still, S saves it to the capture folder.
// • V switches camera, Space pauses, H hides the status line, ESC quits.

use std::time::Instant;

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::Parser;
use tracing::{debug, error, info, warn};

use chroma_cam::camera::{CameraRequest, CameraSource};
use chroma_cam::capture::{self, CaptureArtifact};
use chroma_cam::config::{Args, ViewerConfig};
use chroma_cam::hud::{FpsCounter, ModeBanner, draw_text_5x7};
use chroma_cam::input::InputEvent;
use chroma_cam::source::{TestPattern, VideoSource};
use chroma_cam::surface::{Canvas, DisplaySurface};
use chroma_cam::window::Drawer;
use chroma_cam::{FrameBuffer, ModeChanged, RenderLoop, SessionState};

/// The frame source the shell drives: a real camera or the colour bars.
enum Feed {
    Camera(CameraSource),
    Pattern(TestPattern),
}

impl Feed {
    fn open(config: &ViewerConfig) -> chroma_cam::Result<Self> {
        if config.test_pattern {
            let (w, h) = config.camera_size;
            return Ok(Feed::Pattern(TestPattern::new(w, h)));
        }
        let (width, height) = config.camera_size;
        CameraSource::open(CameraRequest {
            index: config.camera_index,
            width,
            height,
            fps: config.camera_fps,
        })
        .map(Feed::Camera)
    }

    fn switch_to_next(&mut self) -> chroma_cam::Result<()> {
        match self {
            Feed::Camera(cam) => cam.switch_to_next(),
            Feed::Pattern(_) => Ok(()),
        }
    }

    fn adjust_zoom(&mut self, steps: i32) -> Option<i64> {
        match self {
            Feed::Camera(cam) => cam.adjust_zoom(steps),
            Feed::Pattern(_) => None,
        }
    }
}

impl VideoSource for Feed {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            Feed::Camera(cam) => cam.dimensions(),
            Feed::Pattern(p) => p.dimensions(),
        }
    }

    fn next_frame(&mut self) -> chroma_cam::Result<FrameBuffer> {
        match self {
            Feed::Camera(cam) => cam.next_frame(),
            Feed::Pattern(p) => p.next_frame(),
        }
    }

    fn stop(&mut self) {
        match self {
            Feed::Camera(cam) => cam.stop(),
            Feed::Pattern(p) => p.stop(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::from(Args::parse());
    tracing_subscriber::fmt().with_max_level(config.log_level).init();
    run(config)
}

fn run(config: ViewerConfig) -> anyhow::Result<()> {
    /* --- Camera + window setup ---
       Visual: window opens; the first frame shows up on the first tick. */
    let mut feed = Feed::open(&config)
        .context("Unable to access camera. Check permissions and that no other app holds it")?;
    let (sw, sh) = feed.dimensions();
    info!(source_width = sw, source_height = sh, "video source ready");

    let (w, h) = config.window_size;
    let mut drawer = Drawer::new("chroma-cam", w, h, config.target_fps)?;
    let mut canvas = Canvas::new(w, h, config.scale);

    /* --- Session state (mode, filter, scheduling) --- */
    let mut render = RenderLoop::new(config.loop_settings());
    let mut banner = ModeBanner::default();
    let mut fps = FpsCounter::new(Instant::now());
    let mut last_capture: Option<CaptureArtifact> = None;
    let mut show_hud = config.show_hud;

    // What actually goes to the window: canvas + banner + HUD. Captures read the canvas.
    let mut overlay = FrameBuffer::new(0, 0);

    render.start();
    banner.show(render.current_mode().label(), Instant::now());

    let announce = |banner: &mut ModeBanner, ev: ModeChanged| {
        info!(from = ev.from.label(), to = ev.to.label(), "mode changed");
        banner.show(ev.to.label(), Instant::now());
    };

    /* ------------------------------ Main loop ------------------------------ */
    'frames: while drawer.is_open() {
        /* 1) Inputs, applied between ticks */
        for event in drawer.poll() {
            match event {
                InputEvent::Quit => break 'frames,
                InputEvent::CycleMode(delta) => announce(&mut banner, render.advance_mode(delta)),
                InputEvent::SelectMode(index) => {
                    if index < render.modes().len() {
                        announce(&mut banner, render.select_mode(index));
                    }
                }
                InputEvent::AdjustIntensity(delta) => {
                    let value = render.adjust_intensity(delta);
                    info!(policy = ?render.policy_kind(), intensity = value, "intensity");
                }
                InputEvent::Zoom(steps) => match feed.adjust_zoom(steps) {
                    Some(zoom) => info!(zoom, "zoom"),
                    None => debug!("zoom not available"),
                },
                InputEvent::TogglePause => render.toggle_pause(),
                InputEvent::VisibilityChanged(visible) => {
                    if config.pause_unfocused {
                        render.set_visible(visible);
                    }
                }
                InputEvent::Capture => {
                    match capture::capture(canvas.snapshot(), render.current_mode(), config.capture_format, Utc::now()) {
                        Ok(artifact) => {
                            info!(name = %artifact.file_name(), "captured");
                            last_capture = Some(artifact);
                        }
                        Err(err) => warn!(error = %err, "capture failed"),
                    }
                }
                InputEvent::Download => match &last_capture {
                    Some(artifact) => {
                        if let Err(err) = capture::export(artifact, &config.capture_dir) {
                            warn!(error = %err, "saving capture failed");
                        }
                    }
                    None => info!("nothing captured yet (press C)"),
                },
                InputEvent::SwitchCamera => {
                    render.stop(&mut feed);
                    if let Err(err) = feed.switch_to_next() {
                        render.fail(err.to_string());
                        return Err(err).context("switching camera");
                    }
                    render.start();
                }
                InputEvent::ToggleHud => show_hud = !show_hud,
            }
        }

        /* 2) Keep the canvas the size of the window */
        let (ww, wh) = drawer.size();
        canvas.resize(ww.max(1), wh.max(1));

        /* 3) One render tick: camera -> cover -> filter */
        render.tick(&mut feed, &mut canvas);
        if let SessionState::Failed(reason) = render.state() {
            error!(%reason, "no frames available");
            return Err(anyhow!("camera session failed: {reason}"));
        }

        /* 4) Overlay banner + status line, then present */
        let now = Instant::now();
        overlay.clone_from(canvas.snapshot());
        banner.render(&mut overlay, now);
        if show_hud {
            let mut status = format!(
                "{} | {} {:.1} | FPS: {:.1}",
                render.current_mode().label(),
                render.policy_kind().name(),
                render.intensity(),
                fps.fps()
            );
            if render.state() == SessionState::Paused {
                status.push_str(" | PAUSED");
            }
            draw_text_5x7(&mut overlay, 8, 8, &status, 2, 0x00_FF_FF_FF);
        }
        drawer.present(&overlay)?;

        /* 5) FPS (log + HUD once per second) */
        if let Some(f) = fps.frame(now) {
            debug!(fps = f, frames = render.frames_rendered(), "fps");
        }
    }

    render.stop(&mut feed);
    Ok(())
}
