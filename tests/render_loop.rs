// Drives the headless pipeline end to end: colour bars -> canvas -> filter -> capture.

use chroma_cam::capture::{self, CaptureFormat};
use chroma_cam::compositor::ScaleQuality;
use chroma_cam::source::{TestPattern, VideoSource};
use chroma_cam::surface::{Canvas, DisplaySurface};
use chroma_cam::{FilterMode, LoopSettings, ModeSet, PolicyKind, RenderLoop, SessionState, TickOutcome};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn cycles_through_modes_while_streaming() {
    init_tracing();
    let mut render = RenderLoop::new(LoopSettings::default());
    let mut src = TestPattern::new(64, 48);
    // wider canvas than the 4:3 source: cropped top and bottom
    let mut canvas = Canvas::new(100, 50, ScaleQuality::Fast);
    render.start();

    assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Drawn);
    let normal = canvas.snapshot().clone();
    assert!(normal.pixels.chunks_exact(4).any(|px| px[1] > 0));

    render.advance_mode(1);
    assert_eq!(render.current_mode(), FilterMode::Red);
    assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Filtered);
    assert!(canvas.snapshot().pixels.chunks_exact(4).all(|px| px[1] == 0 && px[2] == 0));

    render.advance_mode(1);
    assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Filtered);
    assert!(canvas.snapshot().pixels.chunks_exact(4).all(|px| px[0] == 0 && px[1] == 0));

    render.advance_mode(1);
    assert_eq!(render.current_mode(), FilterMode::Normal);
    assert_eq!(render.frames_rendered(), 3);
    assert_eq!(src.frames_served(), 3);
}

#[test]
fn resume_after_pause_draws_a_fresh_frame() {
    init_tracing();
    let mut render = RenderLoop::new(LoopSettings { modes: ModeSet::RawRedBlue, ..LoopSettings::default() });
    let mut src = TestPattern::new(32, 32);
    let mut canvas = Canvas::new(32, 32, ScaleQuality::Fast);
    render.start();
    render.tick(&mut src, &mut canvas);

    render.pause();
    for _ in 0..5 {
        assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Idle);
    }
    assert_eq!(src.frames_served(), 1);

    render.resume();
    assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Drawn);
    assert_eq!(src.frames_served(), 2);
    // the sweep line moved to row 1: the canvas shows the new frame
    assert_eq!(canvas.snapshot().pixel(0, 1), Some([255, 255, 255, 255]));
}

#[test]
fn capture_of_filtered_canvas_round_trips() {
    init_tracing();
    let mut render = RenderLoop::new(LoopSettings {
        modes: ModeSet::RedBlue,
        policy: PolicyKind::Difference,
        intensity: 1.8,
        ..LoopSettings::default()
    });
    let mut src = TestPattern::new(16, 8);
    let mut canvas = Canvas::new(16, 8, ScaleQuality::Fast);
    render.start();
    assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Filtered);

    let art = capture::capture(canvas.snapshot(), render.current_mode(), CaptureFormat::Png, chrono::Utc::now()).unwrap();
    assert!(art.file_name().starts_with("capture-red_filter-"));
    let decoded = image::load_from_memory(&art.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.into_raw(), canvas.snapshot().pixels);
}

#[test]
fn stopping_the_source_ends_the_session() {
    init_tracing();
    let mut render = RenderLoop::new(LoopSettings { max_frame_failures: 2, ..LoopSettings::default() });
    let mut src = TestPattern::new(8, 8);
    let mut canvas = Canvas::new(8, 8, ScaleQuality::Fast);
    render.start();
    src.stop();
    assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Dropped);
    assert_eq!(render.tick(&mut src, &mut canvas), TickOutcome::Failed);
    assert!(matches!(render.state(), SessionState::Failed(_)));
}
